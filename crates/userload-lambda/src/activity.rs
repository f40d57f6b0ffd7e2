//! Activity bracket messages
//!
//! When enabled, every run is announced on the activity queue twice: before the first row
//! with `expected = 0`, and after the last row with the final count. A crash between the
//! two leaves a lone "started" message, which consumers tolerate.

use crate::error::Result;
use crate::message::activity_message;
use crate::queue::MessagePublisher;
use crate::task::TaskContext;
use chrono::{DateTime, Utc};
use tracing::info;

pub async fn emit_activity<P>(
    context: &TaskContext,
    file_name: &str,
    uploaded_at: &DateTime<Utc>,
    expected: u64,
    sink: &P,
) -> Result<()>
where
    P: MessagePublisher + ?Sized,
{
    let message = activity_message(context, file_name, uploaded_at, expected)?;
    sink.publish(message).await?;

    info!(
        task_id = %context.task_id(),
        queue = %sink.queue(),
        expected,
        "Sent activity message"
    );
    Ok(())
}
