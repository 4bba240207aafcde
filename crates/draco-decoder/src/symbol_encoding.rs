use crate::decoder_buffer::DecoderBuffer;
use crate::rans_symbol_coding::compute_rans_precision_from_unique_symbols_bit_length;
use crate::rans_symbol_decoder::RAnsSymbolDecoder;

pub struct SymbolEncodingOptions {
    pub compression_level: i32,
}

impl Default for SymbolEncodingOptions {
    fn default() -> Self {
        Self {
            compression_level: 7,
        }
    }
}

pub fn decode_symbols(
    num_values: usize,
    num_components: usize,
    _options: &SymbolEncodingOptions,
    in_buffer: &mut DecoderBuffer,
    symbols: &mut [u32],
) -> bool {
    if num_values == 0 {
        return true;
    }

    let scheme = match in_buffer.decode_u8() {
        Ok(v) => v,
        Err(_) => return false,
    };

    // Support both the older internal ids (0/1) and the Draco ids (2/3).
    // Draco uses: 2 = TAGGED, 3 = RAW.
    match scheme {
        0 | 2 => decode_tagged_symbols(num_values, num_components, in_buffer, symbols),
        1 | 3 => decode_raw_symbols(num_values, in_buffer, symbols),
        _ => false,
    }
}

pub fn decode_raw_symbols(num_values: usize, in_buffer: &mut DecoderBuffer, symbols: &mut [u32]) -> bool {
    // Read serialized symbol-bit-length header (written by encoder)
    let symbols_bit_length = match in_buffer.decode_u8() {
        Ok(v) => v as u32,
        Err(_) => return false,
    };
    if symbols_bit_length == 0 {
        for i in 0..num_values {
            symbols[i] = 0;
        }
        return true;
    }
    let unique_symbols_bit_length = symbols_bit_length;
    let precision_bits =
        compute_rans_precision_from_unique_symbols_bit_length(unique_symbols_bit_length);

    match precision_bits {
        12 => decode_raw_symbols_typed::<12>(num_values, in_buffer, symbols),
        13 => decode_raw_symbols_typed::<13>(num_values, in_buffer, symbols),
        14 => decode_raw_symbols_typed::<14>(num_values, in_buffer, symbols),
        15 => decode_raw_symbols_typed::<15>(num_values, in_buffer, symbols),
        16 => decode_raw_symbols_typed::<16>(num_values, in_buffer, symbols),
        17 => decode_raw_symbols_typed::<17>(num_values, in_buffer, symbols),
        18 => decode_raw_symbols_typed::<18>(num_values, in_buffer, symbols),
        19 => decode_raw_symbols_typed::<19>(num_values, in_buffer, symbols),
        20 => decode_raw_symbols_typed::<20>(num_values, in_buffer, symbols),
        _ => false,
    }
}

fn decode_raw_symbols_typed<const PRECISION_BITS: u32>(
    num_values: usize,
    in_buffer: &mut DecoderBuffer,
    symbols: &mut [u32],
) -> bool {
    let mut decoder = RAnsSymbolDecoder::<PRECISION_BITS>::new();
    if !decoder.create(in_buffer) {
        return false;
    }
    if !decoder.start_decoding(in_buffer) {
        return false;
    }
    for i in 0..num_values {
        symbols[i] = decoder.decode_symbol();
    }
    true
}

fn decode_tagged_symbols(
    num_values: usize,
    num_components: usize,
    in_buffer: &mut DecoderBuffer,
    symbols: &mut [u32],
) -> bool {
    // C++ uses RAnsSymbolDecoder<5> where 5 is unique_symbols_bit_length.
    // This maps to precision_bits = 12 via ComputeRAnsPrecisionFromUniqueSymbolsBitLength.
    let mut tag_decoder = RAnsSymbolDecoder::<12>::new();

    if !tag_decoder.create(in_buffer) {
        return false;
    }
    if !tag_decoder.start_decoding(in_buffer) {
        return false;
    }

    // Start bit-decoding for raw values (value_buffer)
    if in_buffer.start_bit_decoding(false).is_err() {
        return false;
    }

    let num_chunks = num_values / num_components;

    for i in 0..num_chunks {
        let len = tag_decoder.decode_symbol();
        if len == 0 || len > 32 {
            return false;
        }
        let val_idx = i * num_components;
        for j in 0..num_components {
            // Read least significant bits for this value
            let val = match in_buffer.decode_least_significant_bits32(len) {
                Ok(v) => v,
                Err(_) => return false,
            };
            symbols[val_idx + j] = val;
        }
    }

    in_buffer.end_bit_decoding();

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_raw_symbols_zero_bit_length_yields_zeros() {
        // symbols_bit_length byte of 0 means every symbol decodes to 0.
        let data = [0u8];
        let mut buffer = DecoderBuffer::new(&data);
        let mut symbols = [7u32; 3];
        assert!(decode_raw_symbols(3, &mut buffer, &mut symbols));
        assert_eq!(symbols, [0, 0, 0]);
    }

    #[test]
    fn decode_symbols_empty_is_noop() {
        let data: [u8; 0] = [];
        let mut buffer = DecoderBuffer::new(&data);
        let options = SymbolEncodingOptions::default();
        let mut symbols: [u32; 0] = [];
        assert!(decode_symbols(0, 1, &options, &mut buffer, &mut symbols));
    }

    #[test]
    fn decode_symbols_rejects_unknown_scheme_id() {
        let data = [9u8];
        let mut buffer = DecoderBuffer::new(&data);
        let options = SymbolEncodingOptions::default();
        let mut symbols = [0u32; 1];
        assert!(!decode_symbols(1, 1, &options, &mut buffer, &mut symbols));
    }
}
