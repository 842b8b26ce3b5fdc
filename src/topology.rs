//! Knit mesh topology: vertices, quad faces and stretch, shear and strut links.

use crate::error::{KnitError, Result};

/// Structural family a link belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkClass {
    /// Axis-aligned neighbours along courses and wales.
    Stretch,
    /// Diagonals crossing one cell.
    Shear,
    /// Skip-one links along a course or a wale.
    Strut,
}

impl LinkClass {
    /// All classes, in the order their forces are applied during a tick.
    pub const ALL: [LinkClass; 3] = [LinkClass::Strut, LinkClass::Shear, LinkClass::Stretch];

    fn slot(self) -> usize {
        match self {
            LinkClass::Stretch => 0,
            LinkClass::Shear => 1,
            LinkClass::Strut => 2,
        }
    }
}

/// Address of a link: its class plus its index within that class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkId {
    pub class: LinkClass,
    pub index: usize,
}

impl LinkId {
    /// Link `index` of `class`.
    pub fn new(class: LinkClass, index: usize) -> Self {
        LinkId { class, index }
    }
}

/// A link between two vertices.
///
/// Rest distance and stiffness are not stored here; they are derived from
/// the current configuration every tick, so coefficient edits never require
/// rebuilding the topology.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub class: LinkClass,
    /// For shear links, the face (stitch) whose cell the diagonal crosses.
    pub face: Option<usize>,
}

/// A quad face, corners in the winding order
/// `(x, y), (x+1, y), (x+1, y+1), (x, y+1)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Face {
    pub id: usize,
    pub vertices: [usize; 4],
}

/// Immutable mesh topology for one `(width, height)` pair.
///
/// Vertex `(x, y)` has index `y * (width + 1) + x`, with `x` in `0..=width`
/// and `y` in `0..=height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    width: usize,
    height: usize,
    faces: Vec<Face>,
    links: [Vec<Link>; 3],
    degrees: [Vec<u32>; 3],
}

impl Topology {
    /// Build the mesh for a grid of `width` x `height` cells.
    ///
    /// Links are enumerated in a single row-major pass over the vertices so
    /// that source, target and ordering are reproducible for equal inputs.
    pub fn build(width: usize, height: usize) -> Result<Self> {
        let invalid = KnitError::InvalidDimension { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        // Every vertex index must fit in a usize.
        let (cols, rows) = match (width.checked_add(1), height.checked_add(1)) {
            (Some(cols), Some(rows)) => (cols, rows),
            _ => return Err(invalid),
        };
        let vertex_count = cols.checked_mul(rows).ok_or(invalid)?;
        let index = |x: usize, y: usize| y * cols + x;

        let mut faces = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                faces.push(Face {
                    id: y * width + x,
                    vertices: [index(x, y), index(x + 1, y), index(x + 1, y + 1), index(x, y + 1)],
                });
            }
        }

        let mut stretch = Vec::with_capacity(width * rows + height * cols);
        let mut shear = Vec::with_capacity(2 * width * height);
        let mut strut = Vec::with_capacity(
            width.saturating_sub(1) * rows + height.saturating_sub(1) * cols,
        );
        let link = |source, target, class, face| Link { source, target, class, face };

        for y in 0..rows {
            for x in 0..cols {
                if x > 0 {
                    // Course
                    stretch.push(link(index(x - 1, y), index(x, y), LinkClass::Stretch, None));

                    if y < height {
                        let stitch = Some(y * width + x - 1);
                        shear.push(link(index(x - 1, y), index(x, y + 1), LinkClass::Shear, stitch));
                        shear.push(link(index(x, y), index(x - 1, y + 1), LinkClass::Shear, stitch));
                    }

                    if x < width {
                        strut.push(link(index(x - 1, y), index(x + 1, y), LinkClass::Strut, None));
                    }
                }

                if y > 0 {
                    // Wale
                    stretch.push(link(index(x, y - 1), index(x, y), LinkClass::Stretch, None));

                    if y < height {
                        strut.push(link(index(x, y - 1), index(x, y + 1), LinkClass::Strut, None));
                    }
                }
            }
        }

        let links = [stretch, shear, strut];
        let degrees = [
            degree_table(&links[0], vertex_count),
            degree_table(&links[1], vertex_count),
            degree_table(&links[2], vertex_count),
        ];

        ftlog::debug!(
            "Built {}x{} knit topology: {} vertices, {} faces, {}/{}/{} stretch/shear/strut links",
            width,
            height,
            vertex_count,
            faces.len(),
            links[0].len(),
            links[1].len(),
            links[2].len()
        );

        Ok(Topology { width, height, faces, links, degrees })
    }

    /// Vertex index of grid coordinate `(x, y)`.
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * (self.width + 1) + x
    }

    /// Grid coordinate `(x, y)` of a vertex index.
    pub fn coords(&self, vertex: usize) -> (usize, usize) {
        (vertex % (self.width + 1), vertex / (self.width + 1))
    }

    /// All faces, row-major.
    pub fn faces(&self) -> &[Face] { &self.faces }

    /// Face `id`, or `FaceOutOfBounds`.
    pub fn face(&self, id: usize) -> Result<&Face> {
        self.faces
            .get(id)
            .ok_or(KnitError::FaceOutOfBounds { index: id, count: self.faces.len() })
    }

    /// Links of one class, in enumeration order.
    pub fn links(&self, class: LinkClass) -> &[Link] {
        &self.links[class.slot()]
    }

    /// The link addressed by `id`, or `LinkOutOfBounds`.
    pub fn link(&self, id: LinkId) -> Result<&Link> {
        let links = self.links(id.class);
        links.get(id.index).ok_or(KnitError::LinkOutOfBounds {
            class: id.class,
            index: id.index,
            count: links.len(),
        })
    }

    /// Number of links of `class` touching each vertex.
    pub fn degrees(&self, class: LinkClass) -> &[u32] {
        &self.degrees[class.slot()]
    }

    /// Checks that `vertex` exists in this topology.
    pub fn check_vertex(&self, vertex: usize) -> Result<()> {
        let count = self.vertex_count();
        if vertex < count {
            Ok(())
        } else {
            Err(KnitError::VertexOutOfBounds { index: vertex, count })
        }
    }

    /// Cells per course.
    pub fn width(&self) -> usize { self.width }
    /// Cells per wale.
    pub fn height(&self) -> usize { self.height }
    /// `(width + 1) * (height + 1)`.
    pub fn vertex_count(&self) -> usize { (self.width + 1) * (self.height + 1) }
    /// Number of faces.
    pub fn face_count(&self) -> usize { self.faces.len() }
    /// Number of links of `class`.
    pub fn link_count(&self, class: LinkClass) -> usize { self.links(class).len() }
}

fn degree_table(links: &[Link], vertex_count: usize) -> Vec<u32> {
    let mut degrees = vec![0u32; vertex_count];
    for link in links {
        degrees[link.source] += 1;
        degrees[link.target] += 1;
    }
    degrees
}
