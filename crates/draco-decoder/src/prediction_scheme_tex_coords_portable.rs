use crate::geometry_attribute::{GeometryAttributeType, PointAttribute};
use crate::geometry_indices::{CornerIndex, PointIndex};
use crate::math_utils::int_sqrt;
use crate::mesh_prediction_scheme_data::MeshPredictionSchemeData;
use crate::prediction_scheme::{PredictionScheme, PredictionSchemeMethod, PredictionSchemeTransformType};

use crate::decoder_buffer::DecoderBuffer;
use crate::prediction_scheme::{PredictionSchemeDecoder, PredictionSchemeDecodingTransform};
use crate::prediction_scheme_wrap::PredictionSchemeWrapDecodingTransform;
use crate::rans_bit_decoder::RAnsBitDecoder;

pub struct PredictionSchemeTexCoordsPortableDecoder<'a> {
    transform: PredictionSchemeWrapDecodingTransform<i32>,
    mesh_data: Option<MeshPredictionSchemeData<'a>>,
    orientations: Vec<bool>,
    pos_attribute: Option<&'a PointAttribute>,
}

impl<'a> PredictionSchemeTexCoordsPortableDecoder<'a> {
    pub fn new(transform: PredictionSchemeWrapDecodingTransform<i32>) -> Self {
        Self {
            transform,
            mesh_data: None,
            orientations: Vec::new(),
            pos_attribute: None,
        }
    }

    pub fn init(&mut self, mesh_data: &MeshPredictionSchemeData<'a>) -> bool {
        self.mesh_data = Some(mesh_data.clone());
        true
    }

    fn get_position_for_entry_id(&self, entry_id: i32, entry_to_point_id_map: &[u32]) -> [i64; 3] {
        let point_id = entry_to_point_id_map[entry_id as usize];
        let att = self.pos_attribute.unwrap();
        let mut pos = [0i64; 3];
        // Assuming 3 components for position
        // We need to read values. PointAttribute stores data in buffer.
        // We can use convert_value equivalent or read directly if we know type.
        // For now, let's assume we can read as i64 (or whatever the attribute stores).
        // But PointAttribute is generic over DataType? No, it holds a DataBuffer.
        // We need to use `convert_value` logic.
        // Since we don't have `convert_value` exposed easily on PointAttribute in Rust yet (maybe?),
        // we might need to implement it or use `read_value`.
        
        // Let's check PointAttribute implementation.
        // For now, assuming generic read.
        
        // Actually, we can use `att.mapped_index(PointIndex(point_id))` to get value index.
        let val_index = att.mapped_index(PointIndex(point_id));
        
        // Helper to read 3 components.
        // This is slow if we do it for every point.
        // But this is what C++ does.
        
        // We need a way to read values as i64.
        // Let's implement a helper in this file.
        read_vector3(att, val_index.0 as usize, &mut pos);
        pos
    }

    fn get_tex_coord_for_entry_id(&self, entry_id: i32, data: &[i32]) -> [i64; 2] {
        let offset = (entry_id * 2) as usize;
        [data[offset] as i64, data[offset + 1] as i64]
    }
    
    fn compute_predicted_value(
        &mut self,
        corner_id: CornerIndex,
        data: &[i32],
        data_id: i32,
        entry_to_point_id_map: &[u32],
        predicted_value: &mut [i32; 2]
    ) -> bool {
        let mesh_data = self.mesh_data.as_ref().unwrap();
        let corner_table = mesh_data.corner_table().unwrap();
        let vertex_to_data_map = mesh_data.vertex_to_data_map().unwrap();

        let next_corner_id = corner_table.next(corner_id);
        let prev_corner_id = corner_table.previous(corner_id);

        let next_vert_id = corner_table.vertex(next_corner_id).0 as usize;
        let prev_vert_id = corner_table.vertex(prev_corner_id).0 as usize;

        let next_data_id = vertex_to_data_map[next_vert_id];
        let prev_data_id = vertex_to_data_map[prev_vert_id];

        if prev_data_id < data_id && next_data_id < data_id {
            let n_uv = self.get_tex_coord_for_entry_id(next_data_id, data);
            let p_uv = self.get_tex_coord_for_entry_id(prev_data_id, data);

            if n_uv == p_uv {
                predicted_value[0] = p_uv[0] as i32;
                predicted_value[1] = p_uv[1] as i32;
                return true;
            }

            let tip_pos = self.get_position_for_entry_id(data_id, entry_to_point_id_map);
            let next_pos = self.get_position_for_entry_id(next_data_id, entry_to_point_id_map);
            let prev_pos = self.get_position_for_entry_id(prev_data_id, entry_to_point_id_map);

            let pn = vec3_sub(&prev_pos, &next_pos);
            let pn_norm2_squared = vec3_squared_norm(&pn);

            if pn_norm2_squared != 0 {
                let cn = vec3_sub(&tip_pos, &next_pos);
                let cn_dot_pn = vec3_dot(&pn, &cn);
                let pn_uv = vec2_sub(&p_uv, &n_uv);

                // Check overflows (omitted for brevity, but should be added for robustness)
                
                let x_uv = vec2_add(
                    &vec2_mul(&n_uv, pn_norm2_squared as i64),
                    &vec2_mul(&pn_uv, cn_dot_pn)
                );

                let x_pos = vec3_add(
                    &next_pos,
                    &vec3_div_scalar(&vec3_mul_scalar(&pn, cn_dot_pn), pn_norm2_squared as i64)
                );
                
                let cx_norm2_squared = vec3_squared_norm(&vec3_sub(&tip_pos, &x_pos));
                
                let mut cx_uv = [pn_uv[1], -pn_uv[0]]; // Rotated
                let norm_squared = int_sqrt(cx_norm2_squared * pn_norm2_squared);
                cx_uv = vec2_mul(&cx_uv, norm_squared as i64);

                if self.orientations.is_empty() {
                    return false;
                }
                let orientation = self.orientations.pop().unwrap(); // Pop from back (stack)

                let predicted_uv = if orientation {
                     vec2_div_scalar(&vec2_add(&x_uv, &cx_uv), pn_norm2_squared as i64)
                } else {
                     vec2_div_scalar(&vec2_sub(&x_uv, &cx_uv), pn_norm2_squared as i64)
                };

                predicted_value[0] = predicted_uv[0] as i32;
                predicted_value[1] = predicted_uv[1] as i32;
                return true;
            }
        }

        let data_offset = if prev_data_id < data_id {
            (prev_data_id * 2) as usize
        } else if next_data_id < data_id {
            (next_data_id * 2) as usize
        } else if data_id > 0 {
            ((data_id - 1) * 2) as usize
        } else {
            predicted_value[0] = 0;
            predicted_value[1] = 0;
            return true;
        };
        predicted_value[0] = data[data_offset];
        predicted_value[1] = data[data_offset + 1];
        true
    }
}

impl<'a> PredictionScheme for PredictionSchemeTexCoordsPortableDecoder<'a> {
    fn get_prediction_method(&self) -> PredictionSchemeMethod {
        PredictionSchemeMethod::MeshPredictionTexCoordsPortable
    }

    fn is_initialized(&self) -> bool {
        self.pos_attribute.is_some() && self.mesh_data.is_some()
    }

    fn get_num_parent_attributes(&self) -> i32 {
        1
    }

    fn get_parent_attribute_type(&self, _i: i32) -> GeometryAttributeType {
        GeometryAttributeType::Position
    }

    fn set_parent_attribute(&mut self, att: &PointAttribute) -> bool {
        if att.attribute_type() != GeometryAttributeType::Position {
            return false;
        }
        if att.num_components() != 3 {
            return false; 
        }
        // We need to store the reference.
        // Since we can't change the lifetime of 'a here easily to match 'att',
        // we are relying on the caller to provide a reference that lives long enough.
        // But the trait signature is `fn set_parent_attribute(&mut self, att: &PointAttribute)`.
        // The `att` reference is only valid for the function call!
        // This is a problem.
        // We cannot store `att` in `self` if `self` lives longer than the function call.
        // But `self` is `PredictionSchemeTexCoordsPortableDecoder<'a>`.
        // If we change the trait to `fn set_parent_attribute<'b>(&mut self, att: &'b PointAttribute)` where `'b: 'a`, it might work.
        // But we can't change the trait easily.
        
        // UNSAFE WORKAROUND:
        // We know that in `SequentialIntegerAttributeDecoder`, the `PointAttribute` (in `PointCloud`) lives as long as the decoder execution.
        // We can cast the reference to a raw pointer and back, or transmute the lifetime.
        // This is dangerous but necessary given the trait constraints and the architecture.
        // Alternatively, we can change the trait to take a lifetime, but that ripples.
        
        // Let's use unsafe to extend the lifetime, assuming the caller guarantees validity.
        unsafe {
            self.pos_attribute = Some(std::mem::transmute::<&PointAttribute, &'a PointAttribute>(att));
        }
        true
    }

    fn get_transform_type(&self) -> PredictionSchemeTransformType {
        self.transform.get_type()
    }
}

impl<'a> PredictionSchemeDecoder<i32, i32> for PredictionSchemeTexCoordsPortableDecoder<'a> {
    fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer) -> bool {
        let num_orientations: i32 = match buffer.decode::<i32>() {
            Ok(val) => val,
            Err(_) => {
                eprintln!("TexCoordsPortable: failed to decode num_orientations");
                return false;
            }
        };
        if num_orientations < 0 {
            eprintln!("TexCoordsPortable: invalid num_orientations={}", num_orientations);
            return false;
        }

        self.orientations.clear();
        self.orientations.reserve(num_orientations as usize);

        let mut last_orientation = true;
        let mut decoder = RAnsBitDecoder::new();
        if !decoder.start_decoding(buffer) {
            eprintln!("TexCoordsPortable: failed to start RAnsBitDecoder");
            return false;
        }

        for _ in 0..num_orientations {
            let is_same = decoder.decode_next_bit();
            let orientation = if is_same { last_orientation } else { !last_orientation };
            self.orientations.push(orientation);
            last_orientation = orientation;
        }
        decoder.end_decoding();

        // Draco then decodes the wrap transform data (min/max bounds).
        self.transform.decode_transform_data(buffer)
    }

    fn compute_original_values(
        &mut self,
        in_corr: &[i32],
        out_data: &mut [i32],
        _size: usize,
        num_components: usize,
        entry_to_point_id_map: Option<&[u32]>,
    ) -> bool {
        if num_components != 2 {
            return false;
        }
        if self.mesh_data.is_none() || self.pos_attribute.is_none() {
            return false;
        }

        self.transform.init(num_components);

        let entry_map = if let Some(map) = entry_to_point_id_map {
            map
        } else {
            return false; // We need the map
        };

        let mesh_data = self.mesh_data.as_ref().unwrap();
        let data_to_corner_map = mesh_data.data_to_corner_map().unwrap();
        let corner_map_size = data_to_corner_map.len();

        let mut predicted_value = [0i32; 2];
        for p in 0..corner_map_size {
            let corner_id = CornerIndex(data_to_corner_map[p]);

            // We pass `out_data` as `data` because it contains the values decoded so far.
            if !self.compute_predicted_value(
                corner_id,
                out_data,
                p as i32,
                entry_map,
                &mut predicted_value,
            ) {
                return false;
            }

            let dst_offset = p * num_components;
            self.transform.compute_original_value(
                &predicted_value,
                &in_corr[dst_offset..dst_offset + 2],
                &mut out_data[dst_offset..dst_offset + 2],
            );
        }
        true
    }
}

// Helper functions for vector math
fn read_vector3(att: &PointAttribute, index: usize, out: &mut [i64; 3]) {
    // This is a placeholder. We need to read actual values.
    // Assuming generic attribute, we can use `buffer().read_component`.
    // But we need to know the type.
    // For now, let's assume we can read as i64 via a helper that handles types.
    // Or we can use `convert_value` if we implement it.
    // Let's implement a simple reader here.
    
    // TODO: Optimize this.
    for c in 0..3 {
        out[c] = read_component_as_i64(att, index, c);
    }
}

fn read_component_as_i64(att: &PointAttribute, index: usize, component: usize) -> i64 {
    use crate::draco_types::DataType;
    let buffer = att.buffer();
    let byte_offset = index * att.byte_stride() as usize + component * att.data_type().byte_length();
    
    // Helper to read bytes
    let read_i8 = |offset| -> i8 { let mut b = [0u8; 1]; buffer.read(offset, &mut b); i8::from_le_bytes(b) };
    let read_u8 = |offset| -> u8 { let mut b = [0u8; 1]; buffer.read(offset, &mut b); u8::from_le_bytes(b) };
    let read_i16 = |offset| -> i16 { let mut b = [0u8; 2]; buffer.read(offset, &mut b); i16::from_le_bytes(b) };
    let read_u16 = |offset| -> u16 { let mut b = [0u8; 2]; buffer.read(offset, &mut b); u16::from_le_bytes(b) };
    let read_i32 = |offset| -> i32 { let mut b = [0u8; 4]; buffer.read(offset, &mut b); i32::from_le_bytes(b) };
    let read_u32 = |offset| -> u32 { let mut b = [0u8; 4]; buffer.read(offset, &mut b); u32::from_le_bytes(b) };
    let read_i64 = |offset| -> i64 { let mut b = [0u8; 8]; buffer.read(offset, &mut b); i64::from_le_bytes(b) };
    let read_u64 = |offset| -> u64 { let mut b = [0u8; 8]; buffer.read(offset, &mut b); u64::from_le_bytes(b) };
    let read_f32 = |offset| -> f32 { let mut b = [0u8; 4]; buffer.read(offset, &mut b); f32::from_le_bytes(b) };
    let read_f64 = |offset| -> f64 { let mut b = [0u8; 8]; buffer.read(offset, &mut b); f64::from_le_bytes(b) };

    match att.data_type() {
        DataType::Int8 => read_i8(byte_offset) as i64,
        DataType::Uint8 => read_u8(byte_offset) as i64,
        DataType::Int16 => read_i16(byte_offset) as i64,
        DataType::Uint16 => read_u16(byte_offset) as i64,
        DataType::Int32 => read_i32(byte_offset) as i64,
        DataType::Uint32 => read_u32(byte_offset) as i64,
        DataType::Int64 => read_i64(byte_offset),
        DataType::Uint64 => read_u64(byte_offset) as i64,
        DataType::Float32 => read_f32(byte_offset) as i64, // Lossy!
        DataType::Float64 => read_f64(byte_offset) as i64, // Lossy!
        DataType::Bool => read_u8(byte_offset) as i64,
        _ => 0,
    }
}

fn vec3_sub(a: &[i64; 3], b: &[i64; 3]) -> [i64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}
fn vec3_add(a: &[i64; 3], b: &[i64; 3]) -> [i64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}
fn vec3_squared_norm(a: &[i64; 3]) -> u64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]) as u64
}
fn vec3_dot(a: &[i64; 3], b: &[i64; 3]) -> i64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
fn vec3_mul_scalar(a: &[i64; 3], s: i64) -> [i64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}
fn vec3_div_scalar(a: &[i64; 3], s: i64) -> [i64; 3] {
    [a[0] / s, a[1] / s, a[2] / s]
}

fn vec2_sub(a: &[i64; 2], b: &[i64; 2]) -> [i64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}
fn vec2_add(a: &[i64; 2], b: &[i64; 2]) -> [i64; 2] {
    [a[0] + b[0], a[1] + b[1]]
}
fn vec2_mul(a: &[i64; 2], s: i64) -> [i64; 2] {
    [a[0] * s, a[1] * s]
}
fn vec2_div_scalar(a: &[i64; 2], s: i64) -> [i64; 2] {
    [a[0] / s, a[1] / s]
}

