use std::collections::BTreeSet;

/// Generation context: the single-video tab or the multi-script tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Context {
    Single,
    Multi,
}

impl Context {
    pub fn all() -> [Context; 2] {
        [Context::Single, Context::Multi]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }
}

/// A renderable region of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum View {
    Tabs,
    ImagePreviews(Context),
    AvatarSelector(Context),
    Voices(Context),
    SingleForm,
    SingleResult,
    Estimate,
    Preview,
    BatchResults,
    AvatarGallery,
    Jobs,
    History,
    Projects,
    SidebarProjects,
    Tags,
    ConfigStatus,
    Notifications,
    Confirmation,
}

/// Views a caller must re-render after a state change
#[must_use = "the affected views have to be re-rendered"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redraw(BTreeSet<View>);

impl Redraw {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(views: impl IntoIterator<Item = View>) -> Self {
        Self(views.into_iter().collect())
    }

    pub fn and(mut self, other: Redraw) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn merge(&mut self, other: Redraw) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, view: View) -> bool {
        self.0.contains(&view)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn views(&self) -> impl Iterator<Item = View> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_deduplicates() {
        let mut redraw = Redraw::of([View::Jobs, View::History]);
        redraw.merge(Redraw::of([View::Jobs]));
        assert_eq!(redraw.views().count(), 2);
        assert!(redraw.contains(View::History));
        assert!(Redraw::none().is_empty());
    }
}
