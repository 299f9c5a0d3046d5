use thiserror::Error;

use crate::models::sequence::SequenceNumber;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid sequence number '{0}': expected 1-4 digits between 0000 and 9999")]
    InvalidSequence(String),

    #[error("Sequence numbers exhausted: no successor after {0}")]
    SequenceExhausted(SequenceNumber),

    #[error("Sequence conflict: request was based on {base} but the last recorded sequence is {}", display_last(.last))]
    SequenceConflict {
        base: SequenceNumber,
        last: Option<SequenceNumber>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

fn display_last(last: &Option<SequenceNumber>) -> String {
    last.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string())
}

pub type Result<T> = std::result::Result<T, Error>;
