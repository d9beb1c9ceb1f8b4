//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener and a `tokio-tungstenite` client so the
//! bytes actually cross a socket.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use podium_transport::{
        Connection, Handshake, Transport, TransportError, WebSocketConnection,
        WebSocketTransport,
    };
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let url = format!("ws://{addr}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    /// Binds on an OS-assigned port and returns the transport and address.
    async fn bind_any() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    /// Accepts one socket and completes its handshake.
    async fn accept_ready(transport: &mut WebSocketTransport) -> WebSocketConnection {
        transport
            .accept()
            .await
            .expect("should accept")
            .handshake()
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move {
            accept_ready(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);

        server_conn
            .send(b"hello from server")
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_binary());
        assert_eq!(msg.into_data().as_ref(), b"hello from server");

        client_ws
            .send(Message::Binary(b"hello from client".to_vec().into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"hello from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_send_text_arrives_as_text_frame() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            accept_ready(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        server_conn
            .send_text(r#"{"event":"host-assigned"}"#)
            .await
            .unwrap();

        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"event":"host-assigned"}"#);
    }

    #[tokio::test]
    async fn test_text_frames_are_received_as_bytes() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            accept_ready(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::text("leave".to_string())).await.unwrap();
        let received = server_conn.recv().await.unwrap().unwrap();
        assert_eq!(received, b"leave");
    }

    #[tokio::test]
    async fn test_send_is_not_blocked_by_pending_recv() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            accept_ready(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn =
            std::sync::Arc::new(server_handle.await.unwrap());

        // Park a reader on the connection; the client never sends.
        let reader = std::sync::Arc::clone(&server_conn);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(
            Duration::from_secs(2),
            server_conn.send_text("pushed"),
        )
        .await
        .expect("send must not wait for the reader")
        .unwrap();

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"pushed");
        pending.abort();
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            accept_ready(&mut transport).await
        });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_silent_socket_does_not_block_next_accept() {
        let (mut transport, addr) = bind_any().await;

        // Never sends an upgrade request.
        let _silent = TcpStream::connect(&addr).await.unwrap();
        let stalled = transport.accept().await.expect("should accept");
        let stalled = tokio::spawn(stalled.handshake());

        let server_handle = tokio::spawn(async move {
            let conn = accept_ready(&mut transport).await;
            (transport, conn)
        });
        let client = tokio::time::timeout(Duration::from_secs(3), connect_client(&addr))
            .await
            .expect("second client should connect while the first is silent");
        drop(client);
        server_handle.await.unwrap();
        stalled.abort();
    }

    #[tokio::test]
    async fn test_handshake_times_out() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .unwrap()
            .with_handshake_timeout(Duration::from_millis(50));
        let addr = transport.local_addr().unwrap().to_string();

        let _silent = TcpStream::connect(&addr).await.unwrap();
        let pending = transport.accept().await.unwrap();
        let result = pending.handshake().await;
        assert!(matches!(result, Err(TransportError::Handshake(_))));
    }

    #[tokio::test]
    async fn test_garbage_upgrade_request_fails_handshake() {
        let (mut transport, addr) = bind_any().await;

        let mut raw = TcpStream::connect(&addr).await.unwrap();
        raw.write_all(b"GET / HTTP/1.1\r\nHost: nowhere\r\n\r\n")
            .await
            .unwrap();
        let pending = transport.accept().await.unwrap();
        assert!(pending.peer_addr().ip().is_loopback());
        let result = pending.handshake().await;
        assert!(matches!(result, Err(TransportError::Handshake(_))));
    }
}
