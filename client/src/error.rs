/// Failures that stop the client from starting.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("could not load the map configuration from {url}: {reason}")]
    Config { url: String, reason: String },
    #[error("could not load texture `{name}` from {src}")]
    Texture { name: String, src: String },
    #[error("page setup failed: {0}")]
    Dom(String),
    #[error("could not connect to the server at {url}: {reason}")]
    Socket { url: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::BootError;

    #[test]
    fn messages_name_the_failing_resource() {
        let err = BootError::Texture {
            name: "town".into(),
            src: "./static/textures/town.png".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not load texture `town` from ./static/textures/town.png"
        );

        let err = BootError::Config {
            url: "http://localhost:4848/config".into(),
            reason: "HTTP 503".into(),
        };
        assert!(err.to_string().ends_with("config: HTTP 503"));
    }
}
