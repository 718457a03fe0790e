//! Races between concurrent writers and readers on a file-backed WAL database.

mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::common::*;
use transloom::app::{
    db,
    domain::{ResolvedRole, Role},
    memberships::{self, audit, MembershipError},
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_project_adds_yield_one_success_and_one_duplicate() {
    let (pool, _db_dir) = file_pool().await;
    let org = create_organization(&pool, "Acme").await;
    let project = create_project(&pool, &org, "Website").await;
    let alice = create_user(&pool, "alice").await;
    memberships::add_organization_member(&pool, &org, &alice, Role::Admin).await.unwrap();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let (pool, project, alice) = (pool.clone(), project.clone(), alice.clone());
            tokio::spawn(async move {
                memberships::add_project_member(&pool, &project, &alice, Role::Translator).await
            })
        })
        .collect();

    let mut successes = 0;
    let mut duplicates = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => successes += 1,
            Err(MembershipError::DuplicateMembership) => duplicates += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!((successes, duplicates), (1, 1));

    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM project_members WHERE project_id = ? AND user_id = ?")
        .bind(project.as_str())
        .bind(alice.as_str())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_racing_organization_adds_yield_exactly_one_success() {
    let (pool, _db_dir) = file_pool().await;
    let org = create_organization(&pool, "Acme").await;
    let alice = create_user(&pool, "alice").await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let (pool, org, alice) = (pool.clone(), org.clone(), alice.clone());
            tokio::spawn(async move {
                memberships::add_organization_member(&pool, &org, &alice, Role::Translator).await
            })
        })
        .collect();

    let mut successes = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => successes += 1,
            Err(MembershipError::DuplicateMembership) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(db::organization_members::list(&pool, &org).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cascade_racing_project_adds_never_leaves_orphans() {
    let (pool, _db_dir) = file_pool().await;
    let org = create_organization(&pool, "Acme").await;
    let alice = create_user(&pool, "alice").await;
    let mut projects = Vec::new();
    for i in 0..6 {
        projects.push(create_project(&pool, &org, &format!("Project {}", i)).await);
    }
    memberships::add_organization_member(&pool, &org, &alice, Role::Admin).await.unwrap();

    let mut adds = Vec::new();
    for project in &projects {
        let (pool, project, alice) = (pool.clone(), project.clone(), alice.clone());
        adds.push(tokio::spawn(async move {
            memberships::add_project_member(&pool, &project, &alice, Role::Translator).await
        }));
    }
    let removal = {
        let (pool, org, alice) = (pool.clone(), org.clone(), alice.clone());
        tokio::spawn(async move { memberships::remove_organization_member(&pool, &org, &alice).await })
    };

    for add in adds {
        match add.await.unwrap() {
            Ok(()) | Err(MembershipError::NotAnOrganizationMember) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    removal.await.unwrap().unwrap();

    audit::verify_consistency(&pool).await.unwrap();
    assert_eq!(project_memberships_in(&pool, &org, &alice).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cascade_is_never_observed_half_applied() {
    let (pool, _db_dir) = file_pool().await;
    let org = create_organization(&pool, "Acme").await;
    let alice = create_user(&pool, "alice").await;
    memberships::add_organization_member(&pool, &org, &alice, Role::Admin).await.unwrap();
    let mut projects = Vec::new();
    for i in 0..8 {
        let project = create_project(&pool, &org, &format!("Project {}", i)).await;
        memberships::add_project_member(&pool, &project, &alice, Role::Translator).await.unwrap();
        projects.push(project);
    }

    let done = Arc::new(AtomicBool::new(false));
    let reads = Arc::new(AtomicUsize::new(0));
    let reader = {
        let (pool, project, alice) = (pool.clone(), projects[0].clone(), alice.clone());
        let (done, reads) = (done.clone(), reads.clone());
        tokio::spawn(async move {
            let mut orphan_observations = 0;
            let mut resolutions = Vec::new();
            loop {
                let finished = done.load(Ordering::SeqCst);
                // One statement, one snapshot: any orphan seen here was committed state.
                orphan_observations += db::project_members::find_orphans(&pool).await.unwrap().len();
                resolutions.push(memberships::resolve_project_role(&pool, &project, &alice).await.unwrap());
                reads.fetch_add(1, Ordering::SeqCst);
                if finished {
                    break;
                }
                tokio::task::yield_now().await;
            }
            (orphan_observations, resolutions)
        })
    };

    while reads.load(Ordering::SeqCst) < 3 {
        tokio::task::yield_now().await;
    }
    memberships::remove_organization_member(&pool, &org, &alice).await.unwrap();
    done.store(true, Ordering::SeqCst);

    let (orphan_observations, resolutions) = reader.await.unwrap();
    assert_eq!(orphan_observations, 0);
    // Before: the project role. After: nothing. The organization role alone would mean
    // the project row vanished while the organization row was still visible.
    for resolved in &resolutions {
        assert!(
            matches!(resolved, ResolvedRole::Project(Role::Translator) | ResolvedRole::NoAccess),
            "observed half-applied state: {:?}",
            resolved
        );
    }
    assert_eq!(resolutions.first(), Some(&ResolvedRole::Project(Role::Translator)));
    assert_eq!(resolutions.last(), Some(&ResolvedRole::NoAccess));
    audit::verify_consistency(&pool).await.unwrap();
}

#[tokio::test]
async fn file_backed_database_is_removed_with_its_directory() {
    let (pool, db_dir) = file_pool().await;
    let dir = db_dir.path().to_path_buf();
    create_organization(&pool, "Acme").await;
    assert!(dir.join("transloom.db").exists());

    pool.close().await;
    drop(db_dir);
    assert!(!dir.exists());
}
