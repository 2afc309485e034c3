mod mock_transcription_engine;
mod openai_whisper_engine;

pub use mock_transcription_engine::{MockTranscriptionEngine, ScriptedSegment};
pub use openai_whisper_engine::OpenAiWhisperEngine;
