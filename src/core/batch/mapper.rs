//! Result mapper
//!
//! Writes the store's responses back onto the caller's records by position.
//! Per-record failures become result codes; only a malformed response list
//! fails the call, and then no record is touched.

use super::translator::BatchRecordRequest;
use super::types::{BatchRecord, BatchSummary, RecordState};
use crate::core::codec::decode_record;
use crate::core::types::ResultCode;
use crate::storage::transport::BatchResponse;
use crate::utils::error::{ClientError, Result};
use tracing::trace;

/// Map `responses` onto `records`
///
/// `requests[i]` and `responses[i]` describe the record at
/// `requests[i].index`; every index is validated before any record is
/// written.
pub fn map_results(
    records: &mut [BatchRecord],
    requests: &[BatchRecordRequest],
    responses: Vec<BatchResponse>,
    states: &mut [RecordState],
) -> Result<BatchSummary> {
    if responses.len() != requests.len() {
        return Err(ClientError::execution(
            ResultCode::ClientError,
            format!(
                "store returned {} results for {} records",
                responses.len(),
                requests.len()
            ),
        ));
    }
    if let Some(request) = requests.iter().find(|r| r.index >= records.len()) {
        return Err(ClientError::internal(format!(
            "request index {} outside of {} records",
            request.index,
            records.len()
        )));
    }

    let mut summary = BatchSummary {
        total: requests.len(),
        ..Default::default()
    };

    for (request, response) in requests.iter().zip(responses) {
        let record = &mut records[request.index];
        record.result = Some(response.result);
        record.in_doubt = response.in_doubt;
        record.record = match (response.result.is_ok(), response.record) {
            (true, Some(stored)) => Some(decode_record(&stored, &request.key)),
            _ => None,
        };

        let next = if response.result.is_ok() {
            summary.succeeded += 1;
            RecordState::Succeeded
        } else {
            summary.failed += 1;
            RecordState::FailedPerRecord
        };
        if let Some(state) = states.get_mut(request.index) {
            if state.can_transition_to(next) {
                *state = next;
            }
        }
        trace!(index = request.index, key = %request.key, result = %response.result, "mapped batch result");
    }
    Ok(summary)
}
