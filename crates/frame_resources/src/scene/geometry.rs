/// Indexed draw arguments for one submesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DrawArgs {
    pub index_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub(crate) usize);

impl GeometryId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Named submesh ranges of one vertex/index buffer pair.
///
/// The buffers themselves live with the device backend; the scene only needs the ranges.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGeometry {
    pub name: String,
    submeshes: Vec<(String, DrawArgs)>,
}

impl MeshGeometry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            submeshes: Vec::new(),
        }
    }

    pub fn with_submesh(mut self, name: impl Into<String>, args: DrawArgs) -> Self {
        self.submeshes.push((name.into(), args));
        self
    }

    pub fn submesh(&self, name: &str) -> Option<DrawArgs> {
        self.submeshes
            .iter()
            .find(|(submesh, _)| submesh == name)
            .map(|(_, args)| *args)
    }

    pub fn submeshes(&self) -> impl Iterator<Item = (&str, DrawArgs)> {
        self.submeshes.iter().map(|(name, args)| (name.as_str(), *args))
    }
}
