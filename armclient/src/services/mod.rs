//! Per-service models and operations

pub mod appconfiguration;
pub mod datamigration;
pub mod resources;
pub mod storagecache;

use crate::client::Client;
use crate::context::Context;
use crate::pollers::{poller_from_response, PollerError};
use crate::response::Response;

/// Checks the initial status of a mutating call, then polls it to completion.
pub(crate) async fn then_poll(
    client: &Client,
    ctx: &Context,
    response: Response,
    expected: &[u16],
) -> Result<(), PollerError> {
    let response = response.ensure_status(expected)?;
    let mut poller = poller_from_response(client, response)?;
    poller.poll_until_done(ctx).await
}
