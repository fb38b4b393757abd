use std::io::Write;

use rs_mimic_core::Identity;
use rs_mimic_core::delivery::{MessageSink, SendError};

/// Writes `recipient<TAB>text` lines instead of talking to a chat server.
pub struct ConsoleSink<W: Write> {
	out: W,
}

impl<W: Write> ConsoleSink<W> {
	pub fn new(out: W) -> Self {
		Self { out }
	}
}

impl<W: Write> MessageSink for ConsoleSink<W> {
	fn send(&mut self, recipient: &Identity, text: &str) -> Result<(), SendError> {
		writeln!(self.out, "{recipient}\t{text}")?;
		self.out.flush()?;
		Ok(())
	}
}
