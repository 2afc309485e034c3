mod ffmpeg_preparer;
mod mock_audio_preparer;

pub use ffmpeg_preparer::FfmpegPreparer;
pub use mock_audio_preparer::MockAudioPreparer;
