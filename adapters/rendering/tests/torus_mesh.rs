use torus_life_core::GridSize;
use torus_life_rendering::{torus::MAJOR_RADIUS, torus::MINOR_RADIUS, RenderingError, TorusMesh};

#[test]
fn mesh_has_one_quad_per_cell() {
    for (columns, rows) in [(10, 10), (50, 50), (100, 37), (100, 100)] {
        let mesh = TorusMesh::tessellate(GridSize::new(columns, rows).expect("valid size"))
            .expect("grid fits in 16-bit indices");
        let cells = (columns * rows) as usize;

        assert_eq!(mesh.vertices.len(), (columns as usize + 1) * (rows as usize + 1));
        assert_eq!(mesh.indices.len(), cells * 6);
        assert_eq!(mesh.triangle_count(), cells * 2);
        let max_index = mesh.indices.iter().copied().max().expect("indices");
        assert_eq!(usize::from(max_index), mesh.vertices.len() - 1);
    }
}

#[test]
fn every_vertex_lies_on_the_torus_surface() {
    let mesh = TorusMesh::tessellate(GridSize::new(12, 9).expect("valid size")).expect("mesh");
    for vertex in &mesh.vertices {
        let position = vertex.position;
        let ring_distance = (position.x * position.x + position.y * position.y).sqrt();
        let tube_distance = ((ring_distance - MAJOR_RADIUS).powi(2) + position.z.powi(2)).sqrt();
        assert!((tube_distance - MINOR_RADIUS).abs() < 1e-4, "{position:?}");
        assert!((0.0..=1.0).contains(&vertex.uv.x));
        assert!((0.0..=1.0).contains(&vertex.uv.y));
    }
}

#[test]
fn first_quad_uses_the_expected_winding() {
    let mesh = TorusMesh::tessellate(GridSize::new(3, 2).expect("valid size")).expect("mesh");
    // Vertex (i, j) has index j * 4 + i.
    assert_eq!(&mesh.indices[..6], &[0, 4, 1, 1, 4, 5]);
}

#[test]
fn grids_beyond_sixteen_bit_indices_are_rejected() {
    let error = TorusMesh::tessellate(GridSize::new(300, 300).expect("valid size"))
        .expect_err("90601 vertices do not fit");
    assert_eq!(
        error,
        RenderingError::MeshTooLarge {
            columns: 300,
            rows: 300,
            vertices: 301 * 301,
        }
    );
}
