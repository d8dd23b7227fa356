/// Where the list of titles for a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    /// One explicit slug.
    Single(String),
    /// Every title already present in the local store.
    LocalStore,
    /// Slugs listed in the collection file.
    CollectionFile,
    /// Titles with cards published since the last watermark scan.
    Updates,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub source: TargetSource,
    /// Wipe and redownload existing images.
    pub force: bool,
    /// Skip every title before this slug in the computed list.
    pub resume_from: Option<String>,
}

impl RunRequest {
    pub fn new(source: TargetSource) -> Self {
        Self {
            source,
            force: false,
            resume_from: None,
        }
    }

    pub fn single(slug: impl Into<String>) -> Self {
        Self::new(TargetSource::Single(slug.into()))
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn resume_from(mut self, slug: impl Into<String>) -> Self {
        self.resume_from = Some(slug.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    FromStart,
    Resumed { index: usize },
    /// A resume slug was given but is not in the list; the run starts over.
    Ignored,
}

impl ResumePoint {
    pub fn start_index(self) -> usize {
        match self {
            ResumePoint::Resumed { index } => index,
            ResumePoint::FromStart | ResumePoint::Ignored => 0,
        }
    }
}

pub fn resume_point(slugs: &[String], resume_from: Option<&str>) -> ResumePoint {
    match resume_from {
        None => ResumePoint::FromStart,
        Some(from) => slugs
            .iter()
            .position(|slug| slug == from)
            .map_or(ResumePoint::Ignored, |index| ResumePoint::Resumed { index }),
    }
}
