use crate::geometry_attribute::PointAttribute;
use crate::geometry_indices::{CornerIndex, INVALID_CORNER_INDEX};
use crate::mesh_prediction_scheme_data::MeshPredictionSchemeData;
use crate::prediction_scheme::{PredictionScheme, PredictionSchemeMethod, PredictionSchemeTransformType};
use crate::prediction_scheme_parallelogram::ParallelogramDataType;
use std::marker::PhantomData;

use crate::decoder_buffer::DecoderBuffer;
use crate::prediction_scheme::{PredictionSchemeDecoder, PredictionSchemeDecodingTransform};
use crate::rans_bit_decoder::RAnsBitDecoder;

pub const MAX_NUM_PARALLELOGRAMS: usize = 4;

pub struct PredictionSchemeConstrainedMultiParallelogramDecoder<'a, DataType, CorrType, Transform> {
    mesh_data: MeshPredictionSchemeData<'a>,
    transform: Transform,
    is_crease_edge: [Vec<bool>; MAX_NUM_PARALLELOGRAMS],
    _marker: PhantomData<(DataType, CorrType)>,
}

impl<'a, DataType, CorrType, Transform>
    PredictionSchemeConstrainedMultiParallelogramDecoder<'a, DataType, CorrType, Transform>
where
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
{
    pub fn new(transform: Transform, mesh_data: MeshPredictionSchemeData<'a>) -> Self {
        Self {
            mesh_data,
            transform,
            is_crease_edge: Default::default(),
            _marker: PhantomData,
        }
    }
}

impl<'a, DataType, CorrType, Transform> PredictionScheme<'a>
    for PredictionSchemeConstrainedMultiParallelogramDecoder<'a, DataType, CorrType, Transform>
where
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
{
    fn get_prediction_method(&self) -> PredictionSchemeMethod {
        PredictionSchemeMethod::MeshPredictionConstrainedMultiParallelogram
    }

    fn is_initialized(&self) -> bool {
        self.mesh_data.corner_table().is_some()
    }

    fn get_num_parent_attributes(&self) -> i32 {
        0
    }

    fn get_parent_attribute_type(&self, _i: i32) -> crate::geometry_attribute::GeometryAttributeType {
        crate::geometry_attribute::GeometryAttributeType::Generic
    }

    fn set_parent_attribute(&mut self, _att: &'a PointAttribute) -> bool {
        false
    }

    fn get_transform_type(&self) -> PredictionSchemeTransformType {
        self.transform.get_type()
    }
}

impl<'a, DataType, CorrType, Transform> PredictionSchemeDecoder<'a, DataType, CorrType>
    for PredictionSchemeConstrainedMultiParallelogramDecoder<'a, DataType, CorrType, Transform>
where
    DataType: ParallelogramDataType + Into<i64> + Copy + Default + From<i32>,
    CorrType: Copy + Default + From<DataType> + std::ops::Sub<Output = CorrType> + From<i32>,
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
    i64: From<DataType>,
{
    fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer) -> bool {
        // Draco bitstream order (see C++ MeshPredictionSchemeConstrainedMultiParallelogramDecoder):
        // 1) (optional) mode for < v2.2
        // 2) crease-edge flag streams
        // 3) underlying transform data (e.g. Wrap bounds)

        // Decode crease edges.
        let corner_table = match self.mesh_data.corner_table() {
            Some(ct) => ct,
            None => return false,
        };
        for i in 0..MAX_NUM_PARALLELOGRAMS {
            let num_flags = match buffer.decode_varint() {
                Ok(v) => v as u32,
                Err(_) => return false,
            };

            if num_flags > corner_table.num_corners() as u32 {
                return false;
            }
            
            if num_flags > 0 {
                self.is_crease_edge[i].resize(num_flags as usize, false);
                let mut ans_decoder = RAnsBitDecoder::new();
                if !ans_decoder.start_decoding(buffer) {
                    return false;
                }
                for j in 0..num_flags {
                    self.is_crease_edge[i][j as usize] = ans_decoder.decode_next_bit();
                }
                ans_decoder.end_decoding();
            }
        }

        // Decode underlying transform data last (e.g. Wrap min/max bounds).
        if !self.transform.decode_transform_data(buffer) {
            return false;
        }
        true
    }

    fn compute_original_values(
        &mut self,
        in_corr: &[CorrType],
        out_data: &mut [DataType],
        size: usize,
        num_components: usize,
        _entry_to_point_id_map: Option<&[u32]>,
    ) -> bool {
        self.transform.init(num_components);

        if size == 0 {
            return true;
        }
        if num_components == 0 || size % num_components != 0 {
            return false;
        }
        if size < num_components {
            return false;
        }
        let num_entries = size / num_components;
        
        let corner_table = self.mesh_data.corner_table().unwrap();
        let vertex_to_data_map = self.mesh_data.vertex_to_data_map().unwrap();

        let mut multi_pred_vals = vec![DataType::default(); num_components];
        
        // Current position in is_crease_edge
        let mut is_crease_edge_pos = [0usize; MAX_NUM_PARALLELOGRAMS];
        
        // First value
        if size > 0 {
            self.transform.compute_original_value(
                &vec![DataType::default(); num_components],
                &in_corr[0..num_components],
                &mut out_data[0..num_components],
            );
        }

        for data_id in 1..num_entries {
            let data_offset = data_id * num_components;
            
            let corner_id = if let Some(map) = self.mesh_data.data_to_corner_map() {
                if data_id < map.len() {
                    CornerIndex(map[data_id])
                } else {
                    INVALID_CORNER_INDEX
                }
            } else if data_id < corner_table.num_vertices() {
                corner_table.left_most_corner(crate::geometry_indices::VertexIndex(data_id as u32))
            } else {
                INVALID_CORNER_INDEX
            };

            if corner_id == INVALID_CORNER_INDEX {
                let prev_offset = (data_id - 1) * num_components;
                let mut predicted_val = vec![DataType::default(); num_components];
                for c in 0..num_components {
                    predicted_val[c] = out_data[prev_offset + c];
                }
                self.transform.compute_original_value(
                    &predicted_val,
                    &in_corr[data_offset..data_offset + num_components],
                    &mut out_data[data_offset..data_offset + num_components],
                );
                continue;
            }

            let mut corners = [INVALID_CORNER_INDEX; MAX_NUM_PARALLELOGRAMS];
            let mut num_parallelograms = 0;
            
            let start_c = corner_id;
            let mut c = start_c;
            let mut first_pass = true;
            while c != INVALID_CORNER_INDEX {
                let opp = corner_table.opposite(c);
                if opp != INVALID_CORNER_INDEX {
                    let opp_v = corner_table.vertex(opp);
                    // Match C++ ComputeParallelogramPrediction(): next/prev must be
                    // taken from the opposite corner (oci), not from |c|.
                    let next_v = corner_table.vertex(corner_table.next(opp));
                    let prev_v = corner_table.vertex(corner_table.previous(opp));

                    let opp_data_id = *vertex_to_data_map.get(opp_v.0 as usize).unwrap_or(&-1);
                    let next_data_id = *vertex_to_data_map.get(next_v.0 as usize).unwrap_or(&-1);
                    let prev_data_id = *vertex_to_data_map.get(prev_v.0 as usize).unwrap_or(&-1);

                    if opp_data_id != -1
                        && next_data_id != -1
                        && prev_data_id != -1
                        && (opp_data_id as usize) < data_id
                        && (next_data_id as usize) < data_id
                        && (prev_data_id as usize) < data_id
                        && num_parallelograms < MAX_NUM_PARALLELOGRAMS {
                            corners[num_parallelograms] = c;
                            num_parallelograms += 1;
                            if num_parallelograms == MAX_NUM_PARALLELOGRAMS {
                                break;
                            }
                        }
                }

                // Proceed to the next corner attached to the vertex.
                c = if first_pass {
                    corner_table.swing_left(c)
                } else {
                    corner_table.swing_right(c)
                };
                if c == start_c {
                    break;
                }
                if c == INVALID_CORNER_INDEX && first_pass {
                    first_pass = false;
                    c = corner_table.swing_right(start_c);
                }
            }

            let mut num_used_parallelograms = 0;
            if num_parallelograms > 0 {
                for k in 0..num_components {
                    multi_pred_vals[k] = DataType::default();
                }
                
                for i in 0..num_parallelograms {
                    let context = num_parallelograms - 1;
                    let pos = is_crease_edge_pos[context];
                    is_crease_edge_pos[context] += 1; // Interior mutability needed?
                    // `compute_original_values` takes `&self`.
                    // We need `RefCell` or `Mutex` for `is_crease_edge_pos` if we want to modify it.
                    // Or we can just use a local variable since we iterate sequentially.
                    // Yes, `is_crease_edge_pos` is local to this function.
                    
                    if pos >= self.is_crease_edge[context].len() {
                        return false;
                    }
                    let is_crease = self.is_crease_edge[context][pos];
                    
                    if !is_crease {
                        // Compute prediction for this parallelogram
                        let ci = corners[i];
                        let oci = corner_table.opposite(ci);
                        let vert_opp = vertex_to_data_map[corner_table.vertex(oci).0 as usize];
                        let vert_next =
                            vertex_to_data_map[corner_table.vertex(corner_table.next(oci)).0 as usize];
                        let vert_prev =
                            vertex_to_data_map[corner_table.vertex(corner_table.previous(oci)).0 as usize];
                        
                        let v_opp_off = (vert_opp as usize) * num_components;
                        let v_next_off = (vert_next as usize) * num_components;
                        let v_prev_off = (vert_prev as usize) * num_components;

                        for k in 0..num_components {
                            let p = DataType::compute_parallelogram_prediction(
                                out_data[v_next_off + k],
                                out_data[v_prev_off + k],
                                out_data[v_opp_off + k],
                            );
                            let sum = multi_pred_vals[k].into() + p.into();
                            multi_pred_vals[k] = DataType::from(sum as i32);
                        }
                        num_used_parallelograms += 1;
                    }
                }
            }

            if num_used_parallelograms == 0 {
                let prev_offset = (data_id - 1) * num_components;
                let mut predicted_val = vec![DataType::default(); num_components];
                for c in 0..num_components {
                    predicted_val[c] = out_data[prev_offset + c];
                }
                self.transform.compute_original_value(
                    &predicted_val,
                    &in_corr[data_offset..data_offset + num_components],
                    &mut out_data[data_offset..data_offset + num_components],
                );
            } else {
                for c in 0..num_components {
                    let val = (multi_pred_vals[c].into() + (num_used_parallelograms as i64 / 2))
                        / num_used_parallelograms as i64;
                    multi_pred_vals[c] = DataType::from(val as i32);
                }
                self.transform.compute_original_value(
                    &multi_pred_vals,
                    &in_corr[data_offset..data_offset + num_components],
                    &mut out_data[data_offset..data_offset + num_components],
                );
            }
        }
        true
    }
}
