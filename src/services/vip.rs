//! VIP (bus) address construction.
//!
//! Once a web caller is authenticated the platform hands the session over to
//! the message bus. The bus address is either
//!
//! - `tcp://<host>:<port>?serverkey=<SK>&publickey=<PK>&secretkey=<SEC>`
//! - `ipc://<path>` (used as-is, abstract sockets like `ipc://@/run/vip.socket` included)
//!
//! The scheme is read with RFC 3986 rules rather than a full URL parser: `ipc`
//! roots with an empty authority are not valid WHATWG URLs but are valid here.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipScheme {
    Tcp,
    Ipc,
}

impl FromStr for VipScheme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "ipc" => Ok(Self::Ipc),
            other => Err(AppError::invalid_argument(format!(
                "Unsupported vip scheme: {other:?}"
            ))),
        }
    }
}

impl fmt::Display for VipScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Ipc => f.write_str("ipc"),
        }
    }
}

// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ), terminated by ':'
fn scheme_of(root: &str) -> &str {
    let Some((scheme, _)) = root.split_once(':') else {
        return "";
    };
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid { scheme } else { "" }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Build the full bus address for `root`.
///
/// `tcp` roots need all three keys; `ipc` roots ignore them.
pub fn build_vip_address(
    root: &str,
    serverkey: Option<&str>,
    publickey: Option<&str>,
    secretkey: Option<&str>,
) -> Result<String> {
    debug!(
        root = %root,
        serverkey = ?serverkey,
        publickey = ?publickey,
        secretkey = ?secretkey.map(|_| "[REDACTED]"),
        "building vip address"
    );

    match scheme_of(root).parse::<VipScheme>()? {
        VipScheme::Tcp => {
            let (Some(serverkey), Some(publickey), Some(secretkey)) = (
                present(serverkey),
                present(publickey),
                present(secretkey),
            ) else {
                return Err(AppError::invalid_argument("All parameters must be entered."));
            };

            Ok(format!(
                "{root}?serverkey={serverkey}&publickey={publickey}&secretkey={secretkey}"
            ))
        }
        VipScheme::Ipc => Ok(root.to_string()),
    }
}
