use crate::prediction_scheme::PredictionSchemeTransformType;
use std::marker::PhantomData;

use crate::decoder_buffer::DecoderBuffer;
use crate::prediction_scheme::PredictionSchemeDecodingTransform;

pub struct PredictionSchemeWrapDecodingTransform<DataType> {
    num_components: usize,
    min_value: DataType,
    max_value: DataType,
    max_dif: DataType,
    _marker: PhantomData<DataType>,
}

impl<DataType> Default for PredictionSchemeWrapDecodingTransform<DataType>
where DataType: Copy + Default
 {
    fn default() -> Self {
        Self::new()
    }
}

impl<DataType> PredictionSchemeWrapDecodingTransform<DataType> 
where DataType: Copy + Default
{
    pub fn new() -> Self {
        Self {
            num_components: 0,
            min_value: DataType::default(),
            max_value: DataType::default(),
            max_dif: DataType::default(),
            _marker: PhantomData,
        }
    }
}

impl PredictionSchemeDecodingTransform<i32, i32> for PredictionSchemeWrapDecodingTransform<i32> {
    fn get_type(&self) -> PredictionSchemeTransformType {
        PredictionSchemeTransformType::Wrap
    }

    fn init(&mut self, num_components: usize) {
        self.num_components = num_components;
    }

    fn compute_original_value(
        &self,
        predicted_vals: &[i32],
        corr_vals: &[i32],
        out_original_vals: &mut [i32],
    ) {
        for i in 0..self.num_components {
            let mut pred = predicted_vals[i];
            if pred < self.min_value {
                pred = self.min_value;
            } else if pred > self.max_value {
                pred = self.max_value;
            }

            let mut val = pred.wrapping_add(corr_vals[i]);
            
            if val < self.min_value {
                val = val.wrapping_add(self.max_dif);
            } else if val > self.max_value {
                val = val.wrapping_sub(self.max_dif);
            }
            
            out_original_vals[i] = val;
        }
    }

    fn decode_transform_data(&mut self, buffer: &mut DecoderBuffer) -> bool {
        if let Ok(min_val) = buffer.decode::<i32>() {
            self.min_value = min_val;
        } else {
            return false;
        }
        if let Ok(max_val) = buffer.decode::<i32>() {
            self.max_value = max_val;
        } else {
            return false;
        }
        
        let dif = (self.max_value as i64) - (self.min_value as i64);
        self.max_dif = (1 + dif) as i32;

        true
    }
}

