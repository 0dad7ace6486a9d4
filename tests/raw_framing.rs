//! Interop with peers that send bare, unframed text.

mod common;

use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use common::{assert_offset, client_tls, connect, start_server};
use time_server::net::tls;
use time_server::protocol::{Framing, Response, TIMESTAMP_FORMAT};

async fn read_reply<S: AsyncRead + Unpin>(stream: &mut S) -> String {
    let mut buf = [0u8; 1024];
    let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("no reply")
        .unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

#[tokio::test]
async fn bare_text_peer_is_served_in_raw_mode() {
    let server = start_server(|config| config.protocol.framing = Framing::Raw).await;

    let tcp = TcpStream::connect(server.addr).await.unwrap();
    let connector = TlsConnector::from(client_tls());
    let mut stream = connector
        .connect(tls::server_name("localhost").unwrap(), tcp)
        .await
        .unwrap();

    stream.write_all(b"set_timezone:JST").await.unwrap();
    assert_eq!(read_reply(&mut stream).await, "Timezone set to JST successfully.");

    stream.write_all(b"get_time").await.unwrap();
    let reply = read_reply(&mut stream).await;
    let parsed = NaiveDateTime::parse_from_str(&reply, TIMESTAMP_FORMAT).unwrap();
    assert_offset(&Response::Time(parsed), 540);
}

#[tokio::test]
async fn raw_client_session_talks_to_raw_server() {
    let server = start_server(|config| config.protocol.framing = Framing::Raw).await;

    let mut client = connect(&server).await;
    assert_eq!(
        client.set_timezone("xyz").await.unwrap(),
        Response::InvalidTimezone
    );
    assert_offset(&client.get_time().await.unwrap(), 45);
}

#[tokio::test]
async fn length_prefixed_replies_carry_a_header() {
    let server = start_server(|_| {}).await;

    let tcp = TcpStream::connect(server.addr).await.unwrap();
    let connector = TlsConnector::from(client_tls());
    let mut stream = connector
        .connect(tls::server_name("localhost").unwrap(), tcp)
        .await
        .unwrap();

    stream.write_u32(8).await.unwrap();
    stream.write_all(b"get_time").await.unwrap();
    stream.flush().await.unwrap();

    let len = stream.read_u32().await.unwrap() as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.unwrap();
    let text = String::from_utf8(payload).unwrap();
    assert_eq!(text.len(), "2024-03-01 12:45:00".len());
    let parsed = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).unwrap();
    assert_offset(&Response::Time(parsed), 45);
}
