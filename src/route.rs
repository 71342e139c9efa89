use std::fmt;

use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.0[index].1 = value;
                let mut seen = 0;
                self.0.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Category,
    Genre,
    Country,
    Year,
}

impl ListingKind {
    pub fn segment(self) -> &'static str {
        match self {
            ListingKind::Category => "list",
            ListingKind::Genre => "genre",
            ListingKind::Country => "country",
            ListingKind::Year => "year",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "list" => Some(ListingKind::Category),
            "genre" => Some(ListingKind::Genre),
            "country" => Some(ListingKind::Country),
            "year" => Some(ListingKind::Year),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    Detail { slug: String },
    Listing { kind: ListingKind, slug: String },
    Search,
    Watch { slug: String, episode: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub page: Page,
    pub query: QueryParams,
}

impl Route {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            query: QueryParams::default(),
        }
    }

    pub fn home() -> Self {
        Self::new(Page::Home)
    }

    pub fn detail(slug: impl Into<String>) -> Self {
        Self::new(Page::Detail { slug: slug.into() })
    }

    pub fn listing(kind: ListingKind, slug: impl Into<String>) -> Self {
        Self::new(Page::Listing {
            kind,
            slug: slug.into(),
        })
    }

    pub fn search(keyword: &str) -> Self {
        Self::new(Page::Search).with_query(QueryParams::from_pairs([("keyword", keyword)]))
    }

    pub fn watch(slug: impl Into<String>, episode: Option<String>) -> Self {
        Self::new(Page::Watch {
            slug: slug.into(),
            episode,
        })
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn parse(location: &str) -> Option<Self> {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, QueryParams::parse(query)),
            None => (location, QueryParams::default()),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let page = match segments.as_slice() {
            [] => Page::Home,
            ["movie", slug] => Page::Detail {
                slug: slug.to_string(),
            },
            ["search"] => Page::Search,
            ["watch", slug] => Page::Watch {
                slug: slug.to_string(),
                episode: None,
            },
            ["watch", slug, episode] => Page::Watch {
                slug: slug.to_string(),
                episode: Some(episode.to_string()),
            },
            [kind, slug] => Page::Listing {
                kind: ListingKind::from_segment(kind)?,
                slug: slug.to_string(),
            },
            _ => return None,
        };

        Some(Self { page, query })
    }

    pub fn path(&self) -> String {
        match &self.page {
            Page::Home => String::from("/"),
            Page::Detail { slug } => format!("/movie/{}", slug),
            Page::Listing { kind, slug } => format!("/{}/{}", kind.segment(), slug),
            Page::Search => String::from("/search"),
            Page::Watch {
                slug,
                episode: Some(episode),
            } => format!("/watch/{}/{}", slug, episode),
            Page::Watch {
                slug,
                episode: None,
            } => format!("/watch/{}", slug),
        }
    }

    /// Route-implied listing dimension, e.g. `/genre/hanh-dong`.
    pub fn implied_listing(&self) -> Option<(ListingKind, &str)> {
        match &self.page {
            Page::Listing { kind, slug } => Some((*kind, slug.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.path())
        } else {
            write!(f, "{}?{}", self.path(), self.query.encode())
        }
    }
}
