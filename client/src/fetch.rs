use std::collections::BTreeMap;

use futures::future::try_join_all;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

use townview_shared::MapConfig;

use crate::error::BootError;

pub const TEXTURE_DIR: &str = "./static/textures";

/// Decoded texture images keyed by the names used in the map config.
pub type Textures = BTreeMap<String, HtmlImageElement>;

/// Fetch the map configuration from the API server.
pub async fn fetch_config(url: &str) -> Result<MapConfig, BootError> {
    let fail = |reason: String| BootError::Config {
        url: url.to_string(),
        reason,
    };

    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| fail(format!("fetch error: {e}")))?;

    if !resp.ok() {
        return Err(fail(format!("HTTP {}", resp.status())));
    }

    resp.json::<MapConfig>()
        .await
        .map_err(|e| fail(format!("parse error: {e}")))
}

/// Load every texture the config names. Fails on the first image that does not decode.
pub async fn fetch_textures(
    dir: &str,
    textures: &BTreeMap<String, String>,
) -> Result<Textures, BootError> {
    let loads = textures
        .iter()
        .map(|(name, file)| load_texture(name.clone(), texture_src(dir, file)));
    let loaded = try_join_all(loads).await?;
    Ok(loaded.into_iter().collect())
}

async fn load_texture(name: String, src: String) -> Result<(String, HtmlImageElement), BootError> {
    let fail = |name: &str, src: &str| BootError::Texture {
        name: name.to_string(),
        src: src.to_string(),
    };

    let image = HtmlImageElement::new().map_err(|_| fail(&name, &src))?;
    image.set_src(&src);
    // decode() rejects when the image fails to load.
    JsFuture::from(image.decode())
        .await
        .map_err(|_| fail(&name, &src))?;
    Ok((name, image))
}

pub fn texture_src(dir: &str, file: &str) -> String {
    format!(
        "{}/{}",
        dir.trim_end_matches('/'),
        file.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_src_joins_without_doubled_slashes() {
        assert_eq!(
            texture_src(TEXTURE_DIR, "town-view.png"),
            "./static/textures/town-view.png"
        );
        assert_eq!(texture_src("./static/", "/a.png"), "./static/a.png");
    }
}
