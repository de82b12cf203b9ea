// decode.rs
//
// Copyright (c) 2026  giflet developers
//

use crate::block::{Animation, BlockCode, ExtensionCode, Frame, TRAILER};
use crate::error::DecodeError;

/// First four bytes of any GIF signature
const GIF_MAGIC: &[u8] = b"GIF8";

/// Fixed length of signature + logical screen descriptor
const HEADER_SZ: usize = 13;

/// Check whether a byte buffer starts with the GIF magic.
///
/// This is the cheap sniff a source resolver should perform before
/// handing bytes to [decode](fn.decode.html).
pub fn is_gif(data: &[u8]) -> bool {
    data.len() >= GIF_MAGIC.len() && &data[..GIF_MAGIC.len()] == GIF_MAGIC
}

/// Split a GIF byte stream into standalone single-image frames.
///
/// Walks the block structure without decompressing pixel data; each
/// returned [Frame](block/struct.Frame.html) carries an independently
/// decodable GIF blob plus its delay and disposal metadata.
///
/// ## Example
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// let anim = giflet::decode(gif)?;
/// for frame in anim.frames() {
///     println!("frame: {} bytes, {} ms", frame.image().len(),
///         frame.delay_ms());
/// }
/// # Ok(())
/// # }
/// ```
pub fn decode(gif: &[u8]) -> Result<Animation, DecodeError> {
    Splitter::new(gif)?.split()
}

/// Block-level scanner over a borrowed GIF buffer
struct Splitter<'a> {
    /// Whole input stream
    gif: &'a [u8],
    /// Scan position
    pos: usize,
    /// Header span: signature, screen descriptor and global color table
    header: &'a [u8],
    /// Most recent graphic control extension span
    graphic_control: &'a [u8],
    /// Packed byte of the most recent graphic control extension
    disposal_raw: u8,
    /// Delay of the most recent graphic control extension
    delay_ms: u32,
    /// Declared repeat count (zero means forever)
    loop_count: u16,
    /// Frames split so far
    frames: Vec<Frame>,
}

impl<'a> Splitter<'a> {
    /// Validate the signature and capture the header span
    fn new(gif: &'a [u8]) -> Result<Self, DecodeError> {
        if gif.len() < 6 || &gif[..3] != b"GIF" {
            return Err(DecodeError::NotAGif);
        }
        match &gif[3..6] {
            b"87a" | b"89a" => {}
            _ => return Err(DecodeError::NotAGif),
        }
        if gif.len() < HEADER_SZ {
            return Err(DecodeError::UnexpectedEndOfFile);
        }
        let flags = gif[10];
        let mut sz = HEADER_SZ;
        if flags & 0x80 != 0 {
            sz += 3 * (2 << (flags & 0x07) as usize);
        }
        if gif.len() < sz {
            return Err(DecodeError::UnexpectedEndOfFile);
        }
        Ok(Splitter {
            gif,
            pos: sz,
            header: &gif[..sz],
            graphic_control: b"",
            disposal_raw: 0,
            delay_ms: 0,
            loop_count: 0,
            frames: vec![],
        })
    }

    /// Read one byte, failing at end of buffer
    fn get(&self, pos: usize) -> Result<u8, DecodeError> {
        self.gif
            .get(pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEndOfFile)
    }

    /// Read a little-endian 16-bit value
    fn get_u16(&self, pos: usize) -> Result<u16, DecodeError> {
        let lo = self.get(pos)?;
        let hi = self.get(pos + 1)?;
        Ok(u16::from(lo) | u16::from(hi) << 8)
    }

    /// Skip length-prefixed sub-blocks starting after `pos`.
    ///
    /// Returns the position of the zero-length terminator.
    fn skip_sub_blocks(&self, mut pos: usize) -> Result<usize, DecodeError> {
        loop {
            pos += 1;
            let len = self.get(pos)?;
            if len == 0 {
                return Ok(pos);
            }
            pos += len as usize;
        }
    }

    /// Scan blocks until the trailer or end of buffer
    fn split(mut self) -> Result<Animation, DecodeError> {
        while self.pos < self.gif.len() {
            let b = self.gif[self.pos];
            match BlockCode::from_u8(b) {
                Some(BlockCode::Trailer_) => break,
                Some(BlockCode::Extension_) => self.extension()?,
                Some(BlockCode::ImageDesc_) => self.image()?,
                None => return Err(DecodeError::UnknownBlock(b)),
            }
            self.pos += 1;
        }
        if self.frames.is_empty() {
            return Err(DecodeError::NoFrames);
        }
        // bytes 6-9 of the header hold the logical screen size
        let width = self.get_u16(6)?;
        let height = self.get_u16(8)?;
        debug!(
            "frames: {}, repeat: {}",
            self.frames.len(),
            self.loop_count
        );
        Ok(Animation::new(self.frames, self.loop_count, width, height))
    }

    /// Handle one extension block (0x21)
    fn extension(&mut self) -> Result<(), DecodeError> {
        let start = self.pos;
        let label = self.get(start + 1)?;
        let end = match ExtensionCode::from(label) {
            ExtensionCode::GraphicControl_ => {
                // packed byte and delay sit at fixed offsets in the
                // 4-byte data sub-block
                self.disposal_raw = self.get(start + 3)?;
                self.delay_ms = u32::from(self.get_u16(start + 4)?) * 10;
                let end = self.skip_sub_blocks(start + 1)?;
                self.graphic_control = &self.gif[start..=end];
                debug!(
                    "graphic control: disposal {:#04x}, delay {} ms",
                    self.disposal_raw, self.delay_ms
                );
                end
            }
            ExtensionCode::Application_ => {
                let end = self.skip_sub_blocks(start + 1)?;
                if let Some(count) = loop_count(&self.gif[start..=end]) {
                    debug!("loop count: {}", count);
                    self.loop_count = count;
                }
                end
            }
            ExtensionCode::PlainText_ | ExtensionCode::Comment_ => {
                self.skip_sub_blocks(start + 1)?
            }
            ExtensionCode::Unknown_(n) => {
                return Err(DecodeError::UnknownExtension(n));
            }
        };
        self.pos = end;
        Ok(())
    }

    /// Handle one image block (0x2C) and emit a frame
    fn image(&mut self) -> Result<(), DecodeError> {
        let start = self.pos;
        // 9 descriptor bytes follow the separator; last one is flags
        let flags = self.get(start + 9)?;
        let mut pos = start + 9;
        pos += 1;
        if flags & 0x80 != 0 {
            pos += 3 * (2 << (flags & 0x07) as usize);
        }
        // pos is now at the LZW minimum code size byte
        let end = self.skip_sub_blocks(pos)?;
        let image = &self.gif[start..=end];
        let mut data = Vec::with_capacity(
            self.header.len() + self.graphic_control.len() + image.len() + 1,
        );
        data.extend_from_slice(self.header);
        data.extend_from_slice(self.graphic_control);
        data.extend_from_slice(image);
        data.push(TRAILER);
        debug!("frame {}: {} bytes", self.frames.len(), data.len());
        self.frames
            .push(Frame::new(data, self.disposal_raw, self.delay_ms));
        self.pos = end;
        Ok(())
    }
}

/// Read the repeat count from a looping application extension.
///
/// Returns `None` unless the block is shaped like a Netscape / Animexts
/// looping extension: 11-byte app id sub-block, then a 3-byte data
/// sub-block with id 1.
fn loop_count(block: &[u8]) -> Option<u16> {
    let looping = block.len() >= 19
        && block[2] == 11
        && (&block[3..14] == b"NETSCAPE2.0" || &block[3..14] == b"ANIMEXTS1.0")
        && block[14] == 3
        && block[15] == 1;
    if looping {
        Some(u16::from(block[16]) | u16::from(block[17]) << 8)
    } else {
        None
    }
}
