//! CSV body to create-user messages

use crate::error::{ProcessError, Result};
use crate::message::{create_user_message, UserRecord};
use crate::queue::MessagePublisher;
use crate::task::TaskContext;
use csv_async::{AsyncReaderBuilder, StringRecord};
use tokio::io::AsyncRead;
use tracing::{debug, instrument};

/// Stream `body` row by row, publishing one create-user message per data row.
///
/// The header row is consumed and never published. Field 0 is the email, field 1 the
/// optional name; rows are sent in file order and the number sent is returned. One
/// record buffer is reused for the whole file.
#[instrument(skip_all, fields(task_id = %context.task_id(), queue = %sink.queue()))]
pub async fn transform<R, P>(body: R, context: &TaskContext, sink: &P) -> Result<u64>
where
    R: AsyncRead + Unpin + Send,
    P: MessagePublisher + ?Sized,
{
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .create_reader(body);
    let mut record = StringRecord::new();
    let mut counter: u64 = 0;

    loop {
        let more = reader
            .read_record(&mut record)
            .await
            .map_err(|source| ProcessError::MalformedInput {
                row: counter + 1,
                source,
            })?;
        if !more {
            break;
        }

        // csv never yields a record without fields
        let user = UserRecord {
            email: record.get(0).unwrap_or_default(),
            name: record.get(1),
        };
        let message = create_user_message(context, user)?;
        sink.publish(message).await?;
        counter += 1;

        if counter % 1000 == 0 {
            debug!(counter, "Create user messages sent so far");
        }
    }

    Ok(counter)
}
