//! clearpath-core: task guides, progress, catalog and voice command resolution.

pub mod capability;
pub mod catalog;
pub mod codec;
pub mod deficiency;
pub mod dictation;
pub mod gateway;
pub mod guide;
pub mod input;
pub mod progress;
pub mod resolver;
pub mod status;
pub mod step;
pub mod storage;

pub use capability::{
    Capabilities, CaptureError, NoCapture, NoSynthesis, SpeechCapture, SpeechSynthesis,
};
pub use catalog::{MAX_RECENTS, SEED_TASKS, TaskCatalog};
pub use codec::{decode_step_set, encode_step_set};
pub use deficiency::DeficiencyType;
pub use dictation::{Dictation, SelectionVoice};
pub use gateway::{GatewayError, GenerativeGateway, RecolorResult, accept_option, validate_steps};
pub use guide::{GuideAction, GuideCommand, GuideSession};
pub use progress::{ProgressMap, ProgressStore, SharedStore, StepCompletion, aggregate_points};
pub use resolver::{CommandHandler, ListenOutcome, VoiceCommandResolver};
pub use status::{STATUS_TTL_SECS, StatusBoard, StatusSink};
pub use step::{POINTS_PER_STEP, ProgressPatch, STEPS_PER_GUIDE, TaskProgress, TaskStep};
pub use storage::{KeyValueStore, MemoryStore};
