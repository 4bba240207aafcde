use crate::decoder_buffer::DecoderBuffer;
use crate::rans_bit_decoder::RAnsBitDecoder;

pub struct FoldedBit32Decoder<'a> {
    folded_number_decoders: Vec<RAnsBitDecoder<'a>>,
    bit_decoder: RAnsBitDecoder<'a>,
}

impl<'a> Default for FoldedBit32Decoder<'a> {
    fn default() -> Self {
        Self {
            folded_number_decoders: (0..32).map(|_| RAnsBitDecoder::new()).collect(),
            bit_decoder: RAnsBitDecoder::new(),
        }
    }
}

impl<'a> FoldedBit32Decoder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_decoding(&mut self, source_buffer: &mut DecoderBuffer<'a>) -> bool {
        for dec in &mut self.folded_number_decoders {
            if !dec.start_decoding(source_buffer) {
                return false;
            }
        }
        self.bit_decoder.start_decoding(source_buffer)
    }

    pub fn decode_next_bit(&mut self) -> bool {
        self.bit_decoder.decode_next_bit()
    }

    pub fn decode_least_significant_bits32(&mut self, nbits: u32, value: &mut u32) {
        let mut result = 0u32;
        for i in 0..nbits {
            let bit = self.folded_number_decoders[i as usize].decode_next_bit();
            result = (result << 1) + (bit as u32);
        }
        *value = result;
    }

    pub fn end_decoding(&mut self) {
        self.bit_decoder.end_decoding();
        for dec in &mut self.folded_number_decoders {
            dec.end_decoding();
        }
    }
}
