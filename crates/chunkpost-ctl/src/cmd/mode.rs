//! Server mode commands.

use anyhow::{bail, Result};

use chunkpost_core::request::{field, function};

use super::http::post_form;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Upload,
    Default,
}

impl Mode {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "upload" => Ok(Mode::Upload),
            "default" => Ok(Mode::Default),
            other => bail!("unknown mode {:?} (expected upload or default)", other),
        }
    }

    fn function(self) -> &'static str {
        match self {
            Mode::Upload => function::SET_UPLOAD_MODE,
            Mode::Default => function::SET_DEFAULT_MODE,
        }
    }
}

pub async fn set_mode(client: &reqwest::Client, url: &str, mode: Mode) -> Result<()> {
    tracing::debug!(?mode, url, "setting server mode");
    post_form(client, url, &[(field::FUNCTION, mode.function().to_string())]).await
}

pub async fn cmd_mode(url: &str, mode: Mode) -> Result<()> {
    set_mode(&reqwest::Client::new(), url, mode).await?;
    println!("Server mode set to {:?}.", mode);
    Ok(())
}
