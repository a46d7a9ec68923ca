pub mod assertions;
pub mod test_server;

pub use assertions::{check_stream_grammar, count_kind, spawned_ids};
pub use recording_transport::RecordingTransport;
pub use scripted_fetcher::{texture_of, ScriptedSkinFetcher};
pub use test_server::{test_config, TestServer, PROTOCOL_1_21_4};

/// Assert that a viewer's message stream is a valid sequence of entity
/// lifetimes
#[macro_export]
macro_rules! assert_stream_valid {
    ($messages:expr) => {
        if let Err(reason) = $crate::check_stream_grammar(&$messages) {
            panic!("invalid message stream: {}\n{:#?}", reason, $messages);
        }
    };
}
