//! LZF block decompression.
//!
//! An encoded block is a sequence of operations, each introduced by a control byte:
//!
//! ```text
//! ctrl < 32:   literal run, copy the next `ctrl + 1` input bytes
//! ctrl >= 32:  back-reference
//!              length   = ctrl >> 5 (+ next byte when it equals 7) + 2
//!              distance = ((ctrl & 0x1f) << 8) + next byte + 1
//! ```
//!
//! Back-references copy from already produced output and may overlap the bytes
//! being written (`distance < length`), which is how runs of a repeated pattern
//! are expressed.

use yxdb_common::{Result, error::Error};

/// Longest literal run a single control byte can express.
pub const MAX_LITERAL_RUN: usize = 32;

/// Decompresses one LZF block from `input` into `output`.
///
/// Returns the number of bytes written to `output`. Nothing carries over between
/// calls: every call starts reading at `input[0]` and writing at `output[0]`.
///
/// # Errors
///
/// * `OutputOverflow` if any operation would write past the end of `output`;
///   the content of `output` must be considered invalid in that case.
/// * `Truncated` if the input ends in the middle of an operation.
/// * `InvalidFormat` if a back-reference points before the start of the output.
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize> {
    LzfState::new(input, output).run()
}

struct LzfState<'a> {
    input: &'a [u8],
    output: &'a mut [u8],
    iidx: usize,
    oidx: usize,
}

impl<'a> LzfState<'a> {
    fn new(input: &'a [u8], output: &'a mut [u8]) -> LzfState<'a> {
        LzfState {
            input,
            output,
            iidx: 0,
            oidx: 0,
        }
    }

    fn run(mut self) -> Result<usize> {
        while self.iidx < self.input.len() {
            let ctrl = self.next_input_byte()? as usize;
            if ctrl < MAX_LITERAL_RUN {
                self.copy_literal_run(ctrl + 1)?;
            } else {
                self.expand_back_reference(ctrl)?;
            }
        }
        Ok(self.oidx)
    }

    fn next_input_byte(&mut self) -> Result<u8> {
        let byte = *self
            .input
            .get(self.iidx)
            .ok_or_else(|| Error::truncated("lzf block", self.iidx + 1, self.input.len()))?;
        self.iidx += 1;
        Ok(byte)
    }

    fn ensure_output_capacity(&self, len: usize) -> Result<()> {
        let required = self.oidx + len;
        if required > self.output.len() {
            return Err(Error::output_overflow(required, self.output.len()));
        }
        Ok(())
    }

    fn copy_literal_run(&mut self, len: usize) -> Result<()> {
        self.ensure_output_capacity(len)?;
        let end = self.iidx + len;
        let literal = self
            .input
            .get(self.iidx..end)
            .ok_or_else(|| Error::truncated("lzf literal run", end, self.input.len()))?;
        self.output[self.oidx..self.oidx + len].copy_from_slice(literal);
        self.iidx = end;
        self.oidx += len;
        Ok(())
    }

    fn expand_back_reference(&mut self, ctrl: usize) -> Result<()> {
        let mut len = ctrl >> 5;
        if len == 7 {
            len += self.next_input_byte()? as usize;
        }
        len += 2;
        self.ensure_output_capacity(len)?;

        let distance = ((ctrl & 0x1f) << 8) + self.next_input_byte()? as usize + 1;
        if distance > self.oidx {
            return Err(Error::invalid_format(
                "lzf back-reference",
                format!(
                    "distance {distance} reaches before the start of output at {}",
                    self.oidx
                ),
            ));
        }

        // Source and destination may overlap, so this must stay a forward
        // byte-by-byte copy.
        let mut reference = self.oidx - distance;
        for _ in 0..len {
            self.output[self.oidx] = self.output[reference];
            self.oidx += 1;
            reference += 1;
        }
        Ok(())
    }
}
