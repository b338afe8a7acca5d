mod mock_engine;
mod remote_engine;

pub use mock_engine::MockTranscriptionEngine;
pub use remote_engine::RemoteTranscriptionEngine;
