//! # Presenters
//!
//! The consumer side of the frame store. A presenter receives a read-only
//! view of the most recently published frame and ships it somewhere: a
//! terminal, a byte stream feeding an LED driver, or memory for tests.
//!
//! Presenters run on their own thread at their own cadence and never touch
//! the producer's write buffer.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use pov_core::Frame;

/// Output backend for completed frames.
pub trait Presenter: Send {
    /// Presents one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend can no longer accept frames. The
    /// presenter loop stops on the first error.
    fn publish(&mut self, frame: &Frame) -> io::Result<()>;
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn publish(&mut self, frame: &Frame) -> io::Result<()> {
        (**self).publish(frame)
    }
}

// =============================================================================
// ASCII
// =============================================================================

/// Text dump, one block per frame.
///
/// Rows are printed outermost first. A pixel shows the digit of the
/// highest lit layer at that position, `.` if every layer is dark.
///
/// ```text
/// -- frame 3 --
/// ..1111..........
/// ..1..1.....4....
/// ```
#[derive(Debug)]
pub struct AsciiPresenter<W> {
    out: W,
    frames: u64,
    line: String,
}

impl<W: Write> AsciiPresenter<W> {
    /// Writes to `out`.
    pub fn new(out: W) -> Self {
        Self { out, frames: 0, line: String::new() }
    }

    /// Consumes the presenter and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Presenter for AsciiPresenter<W> {
    fn publish(&mut self, frame: &Frame) -> io::Result<()> {
        let geometry = frame.geometry();
        self.line.clear();
        // Writing into a String cannot fail.
        let _ = writeln!(self.line, "-- frame {} --", self.frames);

        for row in (0..geometry.rows).rev() {
            for column in 0..geometry.columns {
                let top = (0..geometry.layers).rev().find(|&layer| {
                    frame
                        .pixel(column as i32, row as i32, layer as i32)
                        .is_some_and(|p| p.is_lit())
                });
                match top {
                    Some(layer) => {
                        let digit = char::from_digit((layer % 10) as u32, 10).unwrap_or('#');
                        self.line.push(digit);
                    }
                    None => self.line.push('.'),
                }
            }
            self.line.push('\n');
        }

        self.out.write_all(self.line.as_bytes())?;
        self.out.flush()?;
        self.frames += 1;
        Ok(())
    }
}

// =============================================================================
// RAW BYTES
// =============================================================================

/// Raw RGB stream: each frame's pixels in storage order, 3 bytes each, with
/// no header or separator.
#[derive(Debug)]
pub struct ByteStreamPresenter<W> {
    out: W,
    bytes_written: u64,
}

impl<W: Write> ByteStreamPresenter<W> {
    /// Writes to `out`.
    pub fn new(out: W) -> Self {
        Self { out, bytes_written: 0 }
    }

    /// Total bytes written.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Consumes the presenter and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Presenter for ByteStreamPresenter<W> {
    fn publish(&mut self, frame: &Frame) -> io::Result<()> {
        let bytes = frame.as_bytes();
        self.out.write_all(bytes)?;
        self.out.flush()?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

// =============================================================================
// RECORDING / NULL
// =============================================================================

/// Keeps copies of presented frames in memory.
///
/// Clones share the same recording, so a test can keep one clone and hand
/// the other to the presenter thread.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingPresenter {
    /// Creates an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Copies of every recorded frame, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    /// Most recent frame.
    #[must_use]
    pub fn last(&self) -> Option<Frame> {
        self.frames.lock().last().cloned()
    }
}

impl Presenter for RecordingPresenter {
    fn publish(&mut self, frame: &Frame) -> io::Result<()> {
        self.frames.lock().push(frame.clone());
        Ok(())
    }
}

/// Discards frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn publish(&mut self, _frame: &Frame) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pov_core::{Geometry, Pixel};

    #[test]
    fn test_ascii_layout() {
        let mut frame = Frame::new(Geometry::new(4, 2, 3));
        frame.set_pixel(0, 1, 0, Pixel::WHITE);
        frame.set_pixel(2, 0, 0, Pixel::RED);
        frame.set_pixel(2, 0, 2, Pixel::BLUE);

        let mut presenter = AsciiPresenter::new(Vec::new());
        presenter.publish(&frame).unwrap();
        presenter.publish(&frame).unwrap();

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let expected = "-- frame 0 --\n0...\n..2.\n";
        assert!(text.starts_with(expected), "{text}");
        assert!(text.contains("-- frame 1 --"));
    }

    #[test]
    fn test_byte_stream_is_raw_rgb() {
        let mut frame = Frame::new(Geometry::new(2, 1, 1));
        frame.set_pixel(1, 0, 0, Pixel::new(7, 8, 9));

        let mut presenter = ByteStreamPresenter::new(Vec::new());
        presenter.publish(&frame).unwrap();
        assert_eq!(presenter.bytes_written(), 6);
        assert_eq!(presenter.into_inner(), vec![0, 0, 0, 7, 8, 9]);
    }

    #[test]
    fn test_recording_shared_between_clones() {
        let recording = RecordingPresenter::new();
        let mut presenter: Box<dyn Presenter> = Box::new(recording.clone());
        assert!(recording.is_empty());

        let frame = Frame::new(Geometry::new(1, 1, 1));
        presenter.publish(&frame).unwrap();
        assert_eq!(recording.len(), 1);
        assert_eq!(recording.last(), Some(frame));
    }

    #[test]
    fn test_write_errors_surface() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let frame = Frame::new(Geometry::new(1, 1, 1));
        let err = ByteStreamPresenter::new(Closed).publish(&frame).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
