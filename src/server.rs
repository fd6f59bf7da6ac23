use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::codec;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::queue::{self, ExecutorHandle};
use crate::store::Store;
use crate::Error;

pub async fn run(port: u16) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let executor = queue::start(Store::new());

    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let executor = executor.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, executor).await {
                error!("connection error: {}", e);
            }
        });
    }
}

/// One session: reads command frames off the socket, submits them to the
/// execution queue one at a time, and writes the replies back. Commands from
/// a single connection are therefore processed in the order they were framed.
#[instrument(
    name = "connection",
    skip(stream, executor),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    executor: ExecutorHandle,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    loop {
        let frame = match conn.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            // A malformed prefix is reported to the client and discarded; the
            // connection stays open for the next command.
            Err(codec::Error::Protocol(err)) => {
                conn.discard_buffer();
                conn.write_frame(Frame::Error(err.to_string())).await?;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        debug!("Received frame from client: {:?}", frame);

        let reply = match codec::validate_command(&frame) {
            Ok(()) => executor.execute(frame).await?,
            Err(message) => Frame::Error(message),
        };

        debug!("Sending reply to client: {:?}", reply);
        conn.write_frame(reply).await?;
    }

    info!("Connection closed");
    Ok(())
}
