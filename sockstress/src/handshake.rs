//! Client side of the SOCKS5 method negotiation and RFC 1929 username/password
//! sub-negotiation.
use crate::error::HandshakeError;
use sockstress_core::Credentials;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
#[allow(unused)]
use tracing::{debug, trace};

pub const SOCKS_VERSION: u8 = 0x05;
pub const METHOD_USERNAME_PASSWORD: u8 = 0x02;

pub const AUTH_VERSION: u8 = 0x01;
pub const AUTH_SUCCESS: u8 = 0x00;

/// Version 5, one method offered, username/password.
pub const METHOD_REQUEST: [u8; 3] = [SOCKS_VERSION, 0x01, METHOD_USERNAME_PASSWORD];

/// `01 <ULEN> <username> <PLEN> <password>`
pub fn auth_request(credentials: &Credentials) -> Vec<u8> {
    let username = credentials.username().as_bytes();
    let password = credentials.password().as_bytes();

    let mut buf = Vec::with_capacity(3 + username.len() + password.len());
    buf.push(AUTH_VERSION);
    // NOTE: Credentials guarantees both fields fit in a byte.
    buf.push(username.len() as u8);
    buf.extend_from_slice(username);
    buf.push(password.len() as u8);
    buf.extend_from_slice(password);
    buf
}

/// Run both rounds of the handshake over an already connected stream.
pub async fn negotiate<S>(stream: &mut S, credentials: &Credentials) -> Result<(), HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(&METHOD_REQUEST).await?;

    let mut reply = [0u8; 2];
    stream.read_exact(&mut reply).await?;
    if reply != [SOCKS_VERSION, METHOD_USERNAME_PASSWORD] {
        return Err(HandshakeError::MethodRejected(reply[0], reply[1]));
    }

    stream.write_all(&auth_request(credentials)).await?;

    // The first byte is the sub-negotiation version; only the status matters.
    stream.read_exact(&mut reply).await?;
    if reply[1] != AUTH_SUCCESS {
        return Err(HandshakeError::AuthRejected(reply[1]));
    }

    Ok(())
}

/// Same as [`negotiate`] but reduces the result to success or failure.
pub async fn handshake<S>(stream: &mut S, credentials: &Credentials) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match negotiate(stream, credentials).await {
        Ok(()) => true,
        Err(err) => {
            trace!("Handshake failed: {err}");
            false
        }
    }
}
