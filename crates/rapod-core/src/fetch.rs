//! Page fetching: plain GET returning the body as text.

use anyhow::{Context, Result};

use crate::transport::CurlOptions;

/// GETs `url` and returns the body decoded as (lossy) UTF-8.
///
/// Fails only on network-level errors. The HTTP status is logged but not
/// checked; an error page is still a page.
pub fn fetch_page(url: &str, opts: &CurlOptions) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = opts.easy(url)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer
            .perform()
            .with_context(|| format!("GET {} failed", url))?;
    }

    let code = easy.response_code().unwrap_or(0);
    tracing::debug!(url, code, bytes = body.len(), "fetched page");

    Ok(String::from_utf8_lossy(&body).into_owned())
}
