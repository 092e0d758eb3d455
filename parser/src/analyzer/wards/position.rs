use crate::entity::FieldSnapshot;
use crate::game_constants::{CELL_SIZE, fields};
use crate::types::WorldPos;

/// Decodes the body component's cell/offset pair into world coordinates.
///
/// Returns [`WorldPos::UNKNOWN`] if any of the four sub-fields is missing,
/// which happens when the body component has not been synchronized yet.
pub fn decode_position(entity: &impl FieldSnapshot) -> WorldPos {
    let axes = (
        entity.get_i64(fields::CELL_X),
        entity.get_i64(fields::CELL_Y),
        entity.get_f32(fields::VEC_X),
        entity.get_f32(fields::VEC_Y),
    );
    let (Some(cell_x), Some(cell_y), Some(vec_x), Some(vec_y)) = axes else {
        return WorldPos::UNKNOWN;
    };

    WorldPos::new(world_axis(cell_x, vec_x), world_axis(cell_y, vec_y))
}

fn world_axis(cell: i64, offset: f32) -> f64 {
    cell as f64 * CELL_SIZE + offset as f64
}
