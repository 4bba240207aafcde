use crate::geometry_attribute::{GeometryAttributeType, PointAttribute};
use crate::prediction_scheme::{PredictionScheme, PredictionSchemeMethod, PredictionSchemeTransformType};
use std::marker::PhantomData;

use std::ops::Add;

use crate::prediction_scheme::{PredictionSchemeDecoder, PredictionSchemeDecodingTransform};

pub struct PredictionSchemeDeltaDecodingTransform<DataType, CorrType> {
    num_components: usize,
    _marker: PhantomData<(DataType, CorrType)>,
}

impl<DataType, CorrType> PredictionSchemeDeltaDecodingTransform<DataType, CorrType> {
    pub fn new() -> Self {
        Self {
            num_components: 0,
            _marker: PhantomData,
        }
    }
}

impl<DataType, CorrType> PredictionSchemeDecodingTransform<DataType, CorrType>
    for PredictionSchemeDeltaDecodingTransform<DataType, CorrType>
where
    DataType: Copy + Add<CorrType, Output = DataType>,
    CorrType: Copy,
{
    fn init(&mut self, num_components: usize) {
        self.num_components = num_components;
    }

    fn compute_original_value(
        &self,
        predicted_vals: &[DataType],
        corr_vals: &[CorrType],
        out_original_vals: &mut [DataType],
    ) {
        for i in 0..self.num_components {
            out_original_vals[i] = predicted_vals[i] + corr_vals[i];
        }
    }

    fn decode_transform_data(&mut self, _buffer: &mut crate::decoder_buffer::DecoderBuffer) -> bool {
        true
    }

    fn get_type(&self) -> PredictionSchemeTransformType {
        PredictionSchemeTransformType::Delta
    }
}

pub struct PredictionSchemeDeltaDecoder<DataType, CorrType, Transform> {
    transform: Transform,
    _marker: PhantomData<(DataType, CorrType)>,
}

impl<DataType, CorrType, Transform> PredictionSchemeDeltaDecoder<DataType, CorrType, Transform>
where
    DataType: Copy + Default,
    CorrType: Copy + Default,
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
{
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            _marker: PhantomData,
        }
    }
}

impl<DataType, CorrType, Transform> PredictionScheme
    for PredictionSchemeDeltaDecoder<DataType, CorrType, Transform>
where
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
{
    fn get_prediction_method(&self) -> PredictionSchemeMethod {
        PredictionSchemeMethod::Difference
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn get_num_parent_attributes(&self) -> i32 {
        0
    }

    fn get_parent_attribute_type(&self, _i: i32) -> GeometryAttributeType {
        GeometryAttributeType::Invalid
    }

    fn set_parent_attribute(&mut self, _att: &PointAttribute) -> bool {
        false
    }

    fn get_transform_type(&self) -> PredictionSchemeTransformType {
        self.transform.get_type()
    }
    
    fn are_corrections_positive(&self) -> bool {
        self.transform.are_corrections_positive()
    }
}

impl<DataType, CorrType, Transform> PredictionSchemeDecoder<DataType, CorrType>
    for PredictionSchemeDeltaDecoder<DataType, CorrType, Transform>
where
    DataType: Copy + Default,
    CorrType: Copy + Default,
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
{
    fn compute_original_values(
        &mut self,
        in_corr: &[CorrType],
        out_data: &mut [DataType],
        size: usize,
        num_components: usize,
        _entry_to_point_id_map: Option<&[u32]>,
    ) -> bool {
        self.transform.init(num_components);

        // Decode the original value for the first element.
        let zero_vals = vec![DataType::default(); num_components];
        let corr = &in_corr[0..num_components];
        let out = &mut out_data[0..num_components];
        self.transform
            .compute_original_value(&zero_vals, corr, out);

        // Decode data from the front using D(i) = D(i) + D(i - 1).
        for i in (num_components..size).step_by(num_components) {
            // We need to read the previous value. Since we are writing to out_data,
            // and we need the previous value which is already written, we can't easily
            // take mutable and immutable references to the same slice.
            // However, we can split the slice.
            
            // Safe way: copy previous values to a temp buffer
            let mut predicted = vec![DataType::default(); num_components];
            predicted.copy_from_slice(&out_data[i - num_components..i]);
            
            let corr = &in_corr[i..i + num_components];
            let out = &mut out_data[i..i + num_components];
            
            self.transform.compute_original_value(&predicted, corr, out);
        }

        true
    }

    fn decode_prediction_data(&mut self, buffer: &mut crate::decoder_buffer::DecoderBuffer) -> bool {
        self.transform.decode_transform_data(buffer)
    }
}
