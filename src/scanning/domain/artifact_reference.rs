use crate::shared::error::HarborError;
use std::fmt;

/// Reference used when neither a tag nor a digest is given
pub const DEFAULT_REFERENCE: &str = "latest";

/// Fully-qualified artifact address: `project/repository[:tag|@digest]`
///
/// Invariant: `project`, `repository` and `reference` are non-empty.
/// `reference` is either a tag name or a content digest such as `sha256:...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    project: String,
    repository: String,
    reference: String,
}

impl ArtifactReference {
    /// Parses `project/repository[:tag|@digest]`
    ///
    /// The input is split on the first `/`. In the remainder an `@` wins over
    /// `:` so digests keep their algorithm prefix; otherwise the last `:`
    /// separates the tag, which leaves registry-style repository paths intact.
    ///
    /// # Errors
    /// [`HarborError::InvalidReference`] when there is no `/`, or when the
    /// repository or reference ends up empty.
    pub fn parse(input: &str) -> Result<Self, HarborError> {
        let invalid = |reason: &str| HarborError::InvalidReference {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (project, remainder) = input
            .split_once('/')
            .ok_or_else(|| invalid("expected <project>/<repository>"))?;

        if project.is_empty() {
            return Err(invalid("project name is empty"));
        }

        let (repository, reference) = if let Some((repo, digest)) = remainder.split_once('@') {
            (repo, digest)
        } else if let Some((repo, tag)) = remainder.rsplit_once(':') {
            (repo, tag)
        } else {
            (remainder, DEFAULT_REFERENCE)
        };

        if repository.is_empty() {
            return Err(invalid("repository name is empty"));
        }
        if reference.is_empty() {
            return Err(invalid("tag or digest is empty"));
        }

        Ok(Self {
            project: project.to_string(),
            repository: repository.to_string(),
            reference: reference.to_string(),
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// True when the reference is a content digest rather than a tag
    pub fn is_digest(&self) -> bool {
        self.reference.contains(':')
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.is_digest() { '@' } else { ':' };
        write!(
            f,
            "{}/{}{}{}",
            self.project, self.repository, separator, self.reference
        )
    }
}

/// `project[/repository]` selector used by commands that fan out over a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRepository {
    project: String,
    repository: Option<String>,
}

impl ProjectRepository {
    /// Parses `project` or `project/repository`
    ///
    /// Only the first `/` splits, so nested repository paths such as
    /// `team/app/api` keep `app/api` as the repository.
    ///
    /// # Errors
    /// [`HarborError::InvalidReference`] when the project is empty or an
    /// explicit repository segment is empty (`project/`).
    pub fn parse(input: &str) -> Result<Self, HarborError> {
        let invalid = |reason: &str| HarborError::InvalidReference {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let (project, repository) = match input.split_once('/') {
            Some((project, repo)) => {
                if repo.is_empty() {
                    return Err(invalid("repository name is empty"));
                }
                (project, Some(repo.to_string()))
            }
            None => (input, None),
        };

        if project.is_empty() {
            return Err(invalid("project name is empty"));
        }

        Ok(Self {
            project: project.to_string(),
            repository,
        })
    }

    /// Builds a selector from already-separated parts
    pub fn from_parts(project: &str, repository: Option<&str>) -> Self {
        Self {
            project: project.to_string(),
            repository: repository.map(str::to_string),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }
}

impl fmt::Display for ProjectRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repository {
            Some(repo) => write!(f, "{}/{}", self.project, repo),
            None => write!(f, "{}", self.project),
        }
    }
}
