//! Reference data seeding
//!
//! Inserts the static master-data catalog: industries with their
//! sub-industries, departments with sub-departments, education levels with
//! courses and specializations, job titles and skills.
//!
//! Seeding is idempotent: every item is looked up by (kind, slug) first and
//! re-running against a populated database inserts nothing.

use anyhow::Result;

use crate::db::repositories::MasterDataRepository;
use crate::models::{MasterDataItem, MasterDataKind};

/// One node of the seed catalog. Children are one cascade level down.
struct SeedNode {
    slug: &'static str,
    label: &'static str,
    children: &'static [SeedNode],
}

macro_rules! leaf {
    ($slug:literal, $label:literal) => {
        SeedNode {
            slug: $slug,
            label: $label,
            children: &[],
        }
    };
}

macro_rules! node {
    ($slug:literal, $label:literal, $children:expr) => {
        SeedNode {
            slug: $slug,
            label: $label,
            children: $children,
        }
    };
}

const INDUSTRIES: &[SeedNode] = &[
    node!("information-technology", "Information Technology", &[
        leaf!("software-development", "Software Development"),
        leaf!("it-services", "IT Services"),
        leaf!("hardware", "Hardware"),
    ]),
    node!("finance", "Finance", &[
        leaf!("banking", "Banking"),
        leaf!("insurance", "Insurance"),
        leaf!("fintech", "Fintech"),
    ]),
    node!("healthcare", "Healthcare", &[
        leaf!("hospitals", "Hospitals"),
        leaf!("pharmaceuticals", "Pharmaceuticals"),
    ]),
    node!("manufacturing", "Manufacturing", &[
        leaf!("automotive", "Automotive"),
        leaf!("electronics", "Electronics"),
    ]),
    node!("education", "Education", &[
        leaf!("schools", "Schools"),
        leaf!("edtech", "EdTech"),
    ]),
];

const DEPARTMENTS: &[SeedNode] = &[
    node!("engineering", "Engineering", &[
        leaf!("backend", "Backend"),
        leaf!("frontend", "Frontend"),
        leaf!("qa", "Quality Assurance"),
        leaf!("devops", "DevOps"),
    ]),
    node!("sales", "Sales", &[
        leaf!("inside-sales", "Inside Sales"),
        leaf!("field-sales", "Field Sales"),
    ]),
    node!("marketing", "Marketing", &[
        leaf!("content-marketing", "Content Marketing"),
        leaf!("performance-marketing", "Performance Marketing"),
    ]),
    node!("human-resources", "Human Resources", &[
        leaf!("recruitment", "Recruitment"),
        leaf!("people-operations", "People Operations"),
    ]),
    node!("finance", "Finance", &[
        leaf!("accounting", "Accounting"),
        leaf!("payroll", "Payroll"),
    ]),
];

const EDUCATION_LEVELS: &[SeedNode] = &[
    node!("bachelor", "Bachelor's Degree", &[
        node!("bsc-computer-science", "B.Sc. Computer Science", &[
            leaf!("software-engineering", "Software Engineering"),
            leaf!("data-science", "Data Science"),
        ]),
        node!("bcom", "B.Com", &[
            leaf!("accounting-finance", "Accounting and Finance"),
        ]),
    ]),
    node!("master", "Master's Degree", &[
        node!("msc-computer-science", "M.Sc. Computer Science", &[
            leaf!("machine-learning", "Machine Learning"),
            leaf!("distributed-systems", "Distributed Systems"),
        ]),
        node!("mba", "MBA", &[
            leaf!("mba-finance", "Finance"),
            leaf!("mba-marketing", "Marketing"),
        ]),
    ]),
    node!("diploma", "Diploma", &[
        node!("diploma-it", "Diploma in Information Technology", &[]),
    ]),
];

const JOB_TITLES: &[SeedNode] = &[
    leaf!("software-engineer", "Software Engineer"),
    leaf!("senior-software-engineer", "Senior Software Engineer"),
    leaf!("product-manager", "Product Manager"),
    leaf!("data-analyst", "Data Analyst"),
    leaf!("qa-engineer", "QA Engineer"),
    leaf!("sales-executive", "Sales Executive"),
    leaf!("hr-manager", "HR Manager"),
    leaf!("accountant", "Accountant"),
];

const SKILLS: &[SeedNode] = &[
    leaf!("rust", "Rust"),
    leaf!("sql", "SQL"),
    leaf!("javascript", "JavaScript"),
    leaf!("python", "Python"),
    leaf!("react", "React"),
    leaf!("docker", "Docker"),
    leaf!("communication", "Communication"),
    leaf!("project-management", "Project Management"),
];

/// Seed the full master-data catalog.
///
/// Returns the number of newly inserted items.
pub async fn seed_master_data(repo: &dyn MasterDataRepository) -> Result<usize> {
    let mut inserted = 0;

    inserted += seed_section(repo, MasterDataKind::Industry, INDUSTRIES).await?;
    inserted += seed_section(repo, MasterDataKind::Department, DEPARTMENTS).await?;
    inserted += seed_section(repo, MasterDataKind::EducationLevel, EDUCATION_LEVELS).await?;
    inserted += seed_section(repo, MasterDataKind::JobTitle, JOB_TITLES).await?;
    inserted += seed_section(repo, MasterDataKind::Skill, SKILLS).await?;

    if inserted > 0 {
        tracing::info!("Seeded {} master data item(s)", inserted);
    } else {
        tracing::debug!("Master data already seeded");
    }

    Ok(inserted)
}

/// Seed one catalog section, walking the cascade via `child_kind()`.
///
/// The catalog never nests deeper than the kind topology allows
/// (three levels for education, two for industries/departments).
async fn seed_section(
    repo: &dyn MasterDataRepository,
    kind: MasterDataKind,
    nodes: &[SeedNode],
) -> Result<usize> {
    let mut inserted = 0;

    for (i, node) in nodes.iter().enumerate() {
        let id = ensure_item(repo, kind, node, None, i as i32, &mut inserted).await?;

        let Some(child_kind) = kind.child_kind() else {
            continue;
        };
        for (j, child) in node.children.iter().enumerate() {
            let child_id =
                ensure_item(repo, child_kind, child, Some(id), j as i32, &mut inserted).await?;

            let Some(grandchild_kind) = child_kind.child_kind() else {
                continue;
            };
            for (k, grandchild) in child.children.iter().enumerate() {
                ensure_item(
                    repo,
                    grandchild_kind,
                    grandchild,
                    Some(child_id),
                    k as i32,
                    &mut inserted,
                )
                .await?;
            }
        }
    }

    Ok(inserted)
}

/// Insert the item unless (kind, slug) already exists; returns its ID.
async fn ensure_item(
    repo: &dyn MasterDataRepository,
    kind: MasterDataKind,
    node: &SeedNode,
    parent_id: Option<i64>,
    sort_order: i32,
    inserted: &mut usize,
) -> Result<i64> {
    if let Some(existing) = repo.get_by_kind_slug(kind, node.slug).await? {
        return Ok(existing.id);
    }

    let item = MasterDataItem::new(
        kind,
        node.slug.to_string(),
        node.label.to_string(),
        parent_id,
        sort_order,
    );
    let created = repo.create(&item).await?;
    *inserted += 1;
    Ok(created.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxMasterDataRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_repo() -> SqlxMasterDataRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxMasterDataRepository::new(pool)
    }

    #[tokio::test]
    async fn test_seed_inserts_catalog() {
        let repo = setup_repo().await;

        let inserted = seed_master_data(&repo).await.expect("Seed failed");
        assert!(inserted > 0);

        assert_eq!(
            repo.count_by_kind(MasterDataKind::Industry).await.unwrap(),
            INDUSTRIES.len() as i64
        );
        assert_eq!(
            repo.count_by_kind(MasterDataKind::JobTitle).await.unwrap(),
            JOB_TITLES.len() as i64
        );
        assert_eq!(
            repo.count_by_kind(MasterDataKind::Skill).await.unwrap(),
            SKILLS.len() as i64
        );
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repo = setup_repo().await;

        let first = seed_master_data(&repo).await.expect("First seed failed");
        let second = seed_master_data(&repo).await.expect("Second seed failed");

        assert!(first > 0);
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn test_seed_wires_cascade_parents() {
        let repo = setup_repo().await;
        seed_master_data(&repo).await.expect("Seed failed");

        let it = repo
            .get_by_kind_slug(MasterDataKind::Industry, "information-technology")
            .await
            .unwrap()
            .expect("industry missing");
        let software = repo
            .get_by_kind_slug(MasterDataKind::SubIndustry, "software-development")
            .await
            .unwrap()
            .expect("sub-industry missing");
        assert_eq!(software.parent_id, Some(it.id));

        // Three-level chain: bachelor -> bsc-computer-science -> data-science
        let bachelor = repo
            .get_by_kind_slug(MasterDataKind::EducationLevel, "bachelor")
            .await
            .unwrap()
            .expect("education level missing");
        let bsc = repo
            .get_by_kind_slug(MasterDataKind::Course, "bsc-computer-science")
            .await
            .unwrap()
            .expect("course missing");
        let ds = repo
            .get_by_kind_slug(MasterDataKind::Specialization, "data-science")
            .await
            .unwrap()
            .expect("specialization missing");

        assert_eq!(bsc.parent_id, Some(bachelor.id));
        assert_eq!(ds.parent_id, Some(bsc.id));
    }

    #[test]
    fn test_catalog_slugs_unique_per_kind() {
        fn collect<'a>(
            nodes: &'a [SeedNode],
            kind: MasterDataKind,
            out: &mut Vec<(MasterDataKind, &'a str)>,
        ) {
            for node in nodes {
                out.push((kind, node.slug));
                if let Some(child_kind) = kind.child_kind() {
                    collect(node.children, child_kind, out);
                }
            }
        }

        let mut all = Vec::new();
        collect(INDUSTRIES, MasterDataKind::Industry, &mut all);
        collect(DEPARTMENTS, MasterDataKind::Department, &mut all);
        collect(EDUCATION_LEVELS, MasterDataKind::EducationLevel, &mut all);
        collect(JOB_TITLES, MasterDataKind::JobTitle, &mut all);
        collect(SKILLS, MasterDataKind::Skill, &mut all);

        let mut seen = std::collections::HashSet::new();
        for entry in &all {
            assert!(seen.insert(*entry), "duplicate catalog entry: {:?}", entry);
        }
    }
}
