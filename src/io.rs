//! Doing network IO against a nameserver.
use crate::message::{Message, MAX_UDP_BYTES};
use anyhow::{Context, Result as AResult};
use log::debug;
use std::{
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
    time::Duration,
};

/// Sends the given DNS message to the given nameserver.
/// Returns the binary response.
pub fn send_req(msg: &Message, server: SocketAddr, timeout: Duration) -> AResult<Vec<u8>> {
    let local_addr: SocketAddr = if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local_addr).context("couldn't bind to a local address")?;
    socket.set_read_timeout(Some(timeout))?;
    debug!("Bound to local {}", socket.local_addr()?);
    socket
        .connect(server)
        .with_context(|| format!("couldn't connect to the nameserver {server}"))?;

    // Send the nameserver the message
    let body = msg.serialize_bytes()?;
    debug!("Request size: {} bytes", body.len());
    let bytes_sent = socket.send(&body).context("couldn't send data")?;
    if bytes_sent != body.len() {
        anyhow::bail!("Only sent {bytes_sent} of {} bytes to {server}", body.len());
    }

    // Get the nameserver's response.
    // Note, you have to actually allocate space to write into: reading into an
    // empty vector always instantly succeeds by writing nothing.
    let mut response_buf = vec![0; MAX_UDP_BYTES];
    let received = socket
        .recv(&mut response_buf)
        .with_context(|| format!("no response from {server}"))?;
    debug!("Response size: {received} bytes");
    response_buf.truncate(received);
    Ok(response_buf)
}
