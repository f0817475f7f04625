//! Flat, fixed-size point buffers and the read-only view lent to renderers

use crate::point::*;
use crate::transform::Transform3D;
use crate::{Error, Result};

/// Interleaved xyz positions (and optional rgb colors) for a fixed number of points.
///
/// The point count is fixed at construction. Mutable access is only ever handed
/// out as slices, so the storage can be rewritten in place every frame but never
/// grown or shrunk.
#[derive(Debug, Clone, PartialEq)]
pub struct PointBuffer {
    positions: Vec<f32>,
    colors: Option<Vec<f32>>,
    count: usize,
    needs_update: bool,
}

impl PointBuffer {
    /// Create a buffer of `count` points at the origin, without colors
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(Error::invalid_argument("point count must be positive"));
        }
        Ok(Self {
            positions: vec![0.0; count * COMPONENTS],
            colors: None,
            count,
            needs_update: true,
        })
    }

    /// Create a buffer from interleaved xyz positions
    pub fn from_positions(positions: Vec<f32>) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::invalid_argument("point count must be positive"));
        }
        if positions.len() % COMPONENTS != 0 {
            return Err(Error::invalid_argument(format!(
                "position data length {} is not a multiple of {}",
                positions.len(),
                COMPONENTS
            )));
        }
        let count = positions.len() / COMPONENTS;
        Ok(Self {
            positions,
            colors: None,
            count,
            needs_update: true,
        })
    }

    /// Create a buffer from a list of points
    pub fn from_points(points: &[Point3f]) -> Result<Self> {
        let positions = points.iter().flat_map(|p| [p.x, p.y, p.z]).collect();
        Self::from_positions(positions)
    }

    /// Attach interleaved rgb colors; must hold exactly `3 * count` values
    pub fn with_colors(mut self, colors: Vec<f32>) -> Result<Self> {
        if colors.len() != self.count * COMPONENTS {
            return Err(Error::invalid_argument(format!(
                "color data length {} does not match {} points",
                colors.len(),
                self.count
            )));
        }
        self.colors = Some(colors);
        self.needs_update = true;
        Ok(self)
    }

    /// Number of points
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of floats in the position array (`3 * count`)
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Never true for a constructed buffer; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Mutable positions. Does not mark the buffer dirty; callers that rewrite
    /// it call [`PointBuffer::mark_dirty`].
    pub fn positions_mut(&mut self) -> &mut [f32] {
        &mut self.positions
    }

    pub fn colors(&self) -> Option<&[f32]> {
        self.colors.as_deref()
    }

    pub fn colors_mut(&mut self) -> Option<&mut [f32]> {
        self.colors.as_deref_mut()
    }

    /// Positions and colors borrowed mutably at the same time
    pub fn attributes_mut(&mut self) -> (&mut [f32], Option<&mut [f32]>) {
        (&mut self.positions, self.colors.as_deref_mut())
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Position of point `index`
    ///
    /// # Panics
    /// Panics if `index >= count`.
    pub fn position(&self, index: usize) -> Point3f {
        let i = index * COMPONENTS;
        Point3f::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    /// Overwrite point `index` and mark the buffer dirty
    ///
    /// # Panics
    /// Panics if `index >= count`.
    pub fn set_position(&mut self, index: usize, point: &Point3f) {
        let i = index * COMPONENTS;
        self.positions[i..i + COMPONENTS].copy_from_slice(&[point.x, point.y, point.z]);
        self.needs_update = true;
    }

    /// Color of point `index`, if the buffer carries colors
    pub fn color(&self, index: usize) -> Option<Color3f> {
        let colors = self.colors.as_ref()?;
        let i = index * COMPONENTS;
        Some(Color3f::new(colors[i], colors[i + 1], colors[i + 2]))
    }

    /// Overwrite the color of point `index`. Fails if the buffer has no colors.
    pub fn set_color(&mut self, index: usize, color: Color3f) -> Result<()> {
        let colors = self
            .colors
            .as_mut()
            .ok_or_else(|| Error::invalid_state("buffer has no color attribute"))?;
        let i = index * COMPONENTS;
        colors[i..i + COMPONENTS].copy_from_slice(&color.to_array());
        self.needs_update = true;
        Ok(())
    }

    /// Iterate over the points
    pub fn iter(&self) -> impl Iterator<Item = Point3f> + '_ {
        self.positions
            .chunks_exact(COMPONENTS)
            .map(|c| Point3f::new(c[0], c[1], c[2]))
    }

    /// Iterate over points with their colors (white when the buffer has none)
    pub fn iter_colored(&self) -> impl Iterator<Item = ColoredPoint3f> + '_ {
        (0..self.count).map(move |i| ColoredPoint3f {
            position: self.position(i),
            color: self.color(i).unwrap_or_default(),
        })
    }

    /// Signal that the contents changed and must be re-uploaded
    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    /// Whether the contents changed since the last acknowledged upload
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Clear the dirty flag once the renderer has uploaded the contents
    pub fn acknowledge_upload(&mut self) {
        self.needs_update = false;
    }

    /// Check the length invariants: `positions.len() == 3 * count`, and the same for colors
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() != self.count * COMPONENTS {
            return Err(Error::invalid_state(format!(
                "position data length {} does not match {} points",
                self.positions.len(),
                self.count
            )));
        }
        if let Some(colors) = &self.colors {
            if colors.len() != self.count * COMPONENTS {
                return Err(Error::invalid_state(format!(
                    "color data length {} does not match {} points",
                    colors.len(),
                    self.count
                )));
            }
        }
        Ok(())
    }

    /// Borrow the buffer for upload
    pub fn view(&self) -> BufferView<'_> {
        BufferView {
            positions: &self.positions,
            colors: self.colors.as_deref(),
            instances: None,
            count: self.count,
            needs_update: self.needs_update,
        }
    }
}

/// Read-only borrow of a point buffer handed to the renderer for one frame
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a> {
    pub positions: &'a [f32],
    pub colors: Option<&'a [f32]>,
    /// Per-instance transforms, for fields drawn as instanced meshes
    pub instances: Option<&'a [Transform3D]>,
    pub count: usize,
    pub needs_update: bool,
}

impl<'a> BufferView<'a> {
    /// Attach per-instance transforms
    pub fn with_instances(mut self, instances: &'a [Transform3D]) -> Self {
        self.instances = Some(instances);
        self
    }

    pub fn as_position_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }

    pub fn as_color_bytes(&self) -> Option<&'a [u8]> {
        self.colors.map(bytemuck::cast_slice::<f32, u8>)
    }

    pub fn as_instance_bytes(&self) -> Option<&'a [u8]> {
        self.instances.map(bytemuck::cast_slice::<Transform3D, u8>)
    }
}
