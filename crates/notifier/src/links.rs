/// Builds absolute links into the Kanboard web UI.
pub struct LinkBuilder<'a> {
    base_url: &'a str,
}

impl<'a> LinkBuilder<'a> {
    pub fn new(base_url: &'a str) -> Self {
        Self {
            base_url: base_url.trim(),
        }
    }

    /// Links are only rendered when an application URL is configured.
    pub fn is_enabled(&self) -> bool {
        !self.base_url.is_empty()
    }

    pub fn task_view_url(&self, task_id: i64, project_id: i64) -> String {
        format!(
            "{}/?controller=TaskViewController&action=show&task_id={}&project_id={}",
            self.base_url.trim_end_matches('/'),
            task_id,
            project_id
        )
    }
}
