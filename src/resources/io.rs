use anyhow::Context;

/// Where assets are read from. On native this is a directory (default `assets`), on the web a
/// base URL (empty means the page origin).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRoot(pub String);

impl Default for AssetRoot {
    fn default() -> Self {
        if cfg!(target_arch = "wasm32") {
            Self(String::new())
        } else {
            Self("assets".to_string())
        }
    }
}

impl AssetRoot {
    pub fn new(root: impl Into<String>) -> Self {
        Self(root.into())
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(root: &AssetRoot, dir: &str, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let base = if root.0.is_empty() {
        let window = web_sys::window().context("no global window")?;
        let origin = window
            .location()
            .origin()
            .map_err(|e| anyhow::anyhow!("cannot read page origin: {:?}", e))?;
        format!("{}/", origin)
    } else {
        format!("{}/", root.0.trim_end_matches('/'))
    };
    let base = reqwest::Url::parse(&base)?;
    let dir = format!("{}/", dir.trim_end_matches('/'));
    Ok(base.join(&dir)?.join(file_name)?)
}

/// Filesystem path of `file_name` inside `dir` below `root`. Leading slashes on `dir` are
/// treated as relative to the root, the way a web server would serve them. `file_name` is a URI
/// reference as written in glTF files, so percent escapes such as `%20` are decoded.
#[cfg(not(target_arch = "wasm32"))]
pub fn resolve(root: &AssetRoot, dir: &str, file_name: &str) -> anyhow::Result<std::path::PathBuf> {
    let root = if root.0.is_empty() { "." } else { root.0.as_str() };
    let dir = std::path::absolute(std::path::Path::new(root).join(dir.trim_start_matches('/')))
        .with_context(|| format!("resolving asset directory {}", dir))?;
    let base = url::Url::from_directory_path(&dir)
        .map_err(|()| anyhow::anyhow!("{} is not a usable asset directory", dir.display()))?;
    let url = base
        .join(file_name)
        .with_context(|| format!("invalid asset reference {}", file_name))?;
    url.to_file_path()
        .map_err(|()| anyhow::anyhow!("{} does not point to a local file", url))
}

pub async fn load_binary(root: &AssetRoot, dir: &str, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, dir, file_name)?;
        let response = reqwest::get(url.clone())
            .await?
            .error_for_status()
            .with_context(|| format!("fetching {}", url))?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = resolve(root, dir, file_name)?;
        // TODO: switch to async file IO once loads are driven by a real executor instead of
        // per-frame polling
        std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?
    };

    Ok(data)
}
