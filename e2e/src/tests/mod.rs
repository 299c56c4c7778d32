mod utils;

use bookalope::BookalopeClient;
use bookalope_testnet::EphemeralServer;

/// Start a server and a client authenticated against it.
async fn start() -> (EphemeralServer, BookalopeClient) {
    utils::init_tracing();
    let server = EphemeralServer::start().await.unwrap();
    let client = server.client().unwrap();
    (server, client)
}
