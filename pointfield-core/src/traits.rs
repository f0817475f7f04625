//! Core traits for pointfield

use crate::{buffer::*, point::*};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }
}

/// The renderer side of the buffer hand-off.
///
/// Implementors copy the view into device memory (or wherever they draw from).
/// The view is only valid for the duration of the call.
pub trait UploadSink {
    fn upload(&mut self, view: &BufferView<'_>);
}

impl<F> UploadSink for F
where
    F: FnMut(&BufferView<'_>),
{
    fn upload(&mut self, view: &BufferView<'_>) {
        self(view)
    }
}

impl Drawable for PointBuffer {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let mut points = self.iter();
        let Some(first) = points.next() else {
            return (Point3f::origin(), Point3f::origin());
        };

        let mut min = first;
        let mut max = first;

        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }
}
