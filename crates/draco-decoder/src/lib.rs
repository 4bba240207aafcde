//! Draco Decoder - a decode-only implementation of Google's Draco 3D
//! geometry compression format.
//!
//! This crate reconstructs point clouds and triangular meshes from Draco
//! bitstreams: header parsing and dispatch, rANS entropy decoding, the
//! attribute transform pipeline (quantization, octahedral normals,
//! generic/integer passthrough), and mesh connectivity decoding via either
//! the sequential or Edgebreaker method. It does not encode, and it does
//! not read or write any geometry container format (OBJ/PLY/STL/glTF) -
//! callers hand it raw Draco-encoded bytes and get back an in-memory
//! `PointCloud` or `Mesh`.

pub mod draco_types;
pub mod status;
pub mod bit_utils;
pub mod math_utils;
pub mod vector_extensions;
pub mod data_buffer;
pub mod decoder_buffer;
pub mod version;
pub mod compression_config;
pub mod geometry_indices;
pub mod geometry_attribute;

pub mod quantization_utils;
pub mod normal_compression_utils;
pub mod attribute_transform;
pub mod attribute_transform_data;
pub mod attribute_quantization_transform;
pub mod attribute_octahedron_transform;

pub mod ans;
pub mod rans_symbol_coding;
pub mod rans_bit_decoder;
pub mod rans_symbol_decoder;
pub mod direct_bit_decoder;
pub mod folded_bit32_coder;
pub mod symbol_encoding;

pub mod prediction_scheme;
pub mod prediction_scheme_wrap;
pub mod prediction_scheme_delta;
pub mod prediction_scheme_parallelogram;
pub mod prediction_scheme_constrained_multi_parallelogram;
pub mod prediction_scheme_tex_coords_portable;
pub mod prediction_scheme_normal_octahedron_transform_base;
pub mod prediction_scheme_normal_octahedron_canonicalized_transform_base;
pub mod prediction_scheme_normal_octahedron_canonicalized_decoding_transform;
pub mod prediction_scheme_geometric_normal;
pub mod prediction_scheme_selection;
pub mod mesh_prediction_scheme_data;

pub mod sequential_attribute_decoder;
pub mod sequential_integer_attribute_decoder;
pub mod sequential_generic_attribute_decoder;
pub mod sequential_normal_attribute_decoder;

pub mod corner_table;
pub mod mesh_edgebreaker_shared;
pub mod mesh_edgebreaker_decoder;

pub mod point_cloud;
pub mod mesh;
pub mod point_cloud_decoder;
pub mod mesh_decoder;

pub use draco_types::DataType;
pub use status::{DracoError, Status, ok_status};
pub use point_cloud::PointCloud;
pub use mesh::Mesh;
pub use point_cloud_decoder::{GeometryDecoder, PointCloudDecoder};
pub use mesh_decoder::MeshDecoder;

use decoder_buffer::DecoderBuffer;

/// Decodes a Draco bitstream known to hold a triangular mesh.
///
/// Returns an error if the bitstream is malformed, carries an unsupported
/// version, or actually encodes a point cloud.
pub fn decode_mesh(data: &[u8]) -> Result<Mesh, DracoError> {
    if decoded_geometry_type(data)? != DecodedGeometry::Mesh {
        return Err(DracoError::InvalidParameter(
            "bitstream does not encode a mesh".to_string(),
        ));
    }
    let mut buffer = DecoderBuffer::new(data);
    let mut decoder = MeshDecoder::new();
    let mut mesh = Mesh::new();
    decoder.decode(&mut buffer, &mut mesh)?;
    Ok(mesh)
}

/// Decodes a Draco bitstream known to hold a point cloud.
///
/// Returns an error if the bitstream is malformed, carries an unsupported
/// version, or actually encodes a mesh.
pub fn decode_point_cloud(data: &[u8]) -> Result<PointCloud, DracoError> {
    if decoded_geometry_type(data)? != DecodedGeometry::PointCloud {
        return Err(DracoError::InvalidParameter(
            "bitstream does not encode a point cloud".to_string(),
        ));
    }
    let mut buffer = DecoderBuffer::new(data);
    let mut decoder = PointCloudDecoder::new();
    let mut point_cloud = PointCloud::new();
    decoder.decode(&mut buffer, &mut point_cloud)?;
    Ok(point_cloud)
}

/// Identifies the geometry kind encoded in a Draco bitstream, read from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedGeometry {
    PointCloud,
    Mesh,
}

/// Inspects the bitstream header to determine whether it holds a point cloud or a mesh,
/// without consuming the buffer used to do so.
pub fn decoded_geometry_type(data: &[u8]) -> Result<DecodedGeometry, DracoError> {
    // Byte layout: 5-byte "DRACO" magic, major version, minor version, then the
    // geometry type byte (0 = point cloud, 1 = triangular mesh).
    if data.len() < 8 {
        return Err(DracoError::BufferError("buffer too small for a Draco header".to_string()));
    }
    if &data[0..5] != b"DRACO" {
        return Err(DracoError::DracoError("not a Draco bitstream".to_string()));
    }
    match data[7] {
        0 => Ok(DecodedGeometry::PointCloud),
        1 => Ok(DecodedGeometry::Mesh),
        other => Err(DracoError::DracoError(format!("unknown geometry type: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_draco_buffers() {
        let data = [0u8; 16];
        assert!(decoded_geometry_type(&data).is_err());
    }

    #[test]
    fn rejects_short_buffers() {
        let data = b"DRACO";
        assert!(decoded_geometry_type(data).is_err());
    }

    #[test]
    fn detects_mesh_header() {
        let mut data = b"DRACO".to_vec();
        data.push(2); // major
        data.push(2); // minor
        data.push(1); // mesh
        assert_eq!(decoded_geometry_type(&data).unwrap(), DecodedGeometry::Mesh);
    }

    #[test]
    fn detects_point_cloud_header() {
        let mut data = b"DRACO".to_vec();
        data.push(2);
        data.push(2);
        data.push(0);
        assert_eq!(decoded_geometry_type(&data).unwrap(), DecodedGeometry::PointCloud);
    }

    // Sequential mesh: raw u8 indices, 4 points, 4 faces (tetrahedron), no
    // attributes. Bitstream version 1.2 so the header carries no flags field
    // and num_faces/num_points are fixed-width u32 rather than varint.
    fn sequential_tetrahedron_bitstream() -> Vec<u8> {
        let mut data = b"DRACO".to_vec();
        data.push(1); // major
        data.push(2); // minor
        data.push(1); // geometry type: mesh
        data.push(0); // method: sequential
        data.extend_from_slice(&4u32.to_le_bytes()); // num_faces
        data.extend_from_slice(&4u32.to_le_bytes()); // num_points
        data.push(1); // connectivity_method: raw
        data.extend_from_slice(&[0, 1, 2, 0, 2, 3, 0, 3, 1, 1, 3, 2]); // face indices, u8 each
        data.push(0); // num_attributes_decoders
        data
    }

    #[test]
    fn decode_mesh_decodes_sequential_connectivity() {
        let data = sequential_tetrahedron_bitstream();
        let mesh = decode_mesh(&data).unwrap();
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_points(), 4);
        let face0 = mesh.face(crate::geometry_indices::FaceIndex(0));
        assert_eq!(face0.map(|v| v.0), [0, 1, 2]);
        let face3 = mesh.face(crate::geometry_indices::FaceIndex(3));
        assert_eq!(face3.map(|v| v.0), [1, 3, 2]);
    }

    #[test]
    fn decode_mesh_rejects_bad_magic() {
        let mut data = b"DRACX".to_vec();
        data.extend_from_slice(&[1, 2, 1, 0]);
        assert!(decode_mesh(&data).is_err());
    }

    #[test]
    fn decode_mesh_rejects_unsupported_version() {
        let mut data = b"DRACO".to_vec();
        data.push(99); // major - far beyond DRACO_MESH_BITSTREAM_VERSION_MAJOR
        data.push(99);
        data.push(1); // geometry type: mesh
        data.push(0);
        let err = decode_mesh(&data).unwrap_err();
        assert!(matches!(err, DracoError::UnsupportedVersion(_)));
    }

    #[test]
    fn decode_mesh_rejects_truncated_buffer() {
        // A valid-looking header with no connectivity payload behind it.
        let mut data = b"DRACO".to_vec();
        data.push(1);
        data.push(2);
        data.push(1); // mesh
        data.push(0); // sequential
        assert!(decode_mesh(&data).is_err());
    }
}
