mod common;

use common::{applicant, github_link, Harness};
use hiring_pipeline::models::{
    candidate::{CandidateStatus, LinkKind, TaskLink},
    interview::InterviewResult,
};
use hiring_pipeline::services::notification_service::NotificationEvent;
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::test]
async fn full_pipeline_sends_four_notifications() {
    let h = Harness::new().await;

    let candidate = h.apply("Alice@Example.com ").await;
    assert_eq!(candidate.status, CandidateStatus::Applied);
    assert_eq!(candidate.email, "alice@example.com");
    assert!(candidate.application_id.starts_with("APP-"));

    let candidate = h
        .pipeline()
        .submit_task(&candidate.application_id, github_link())
        .await
        .unwrap();
    assert_eq!(candidate.status, CandidateStatus::TaskSubmitted);

    let candidate = h
        .pipeline()
        .evaluate(candidate.id, 75, Some("solid".into()), h.interviewer.id)
        .await
        .unwrap();
    assert_eq!(candidate.status, CandidateStatus::InterviewEligible);

    let interview = h
        .pipeline()
        .schedule_interview(h.schedule_request(candidate.id), h.hr.id)
        .await
        .unwrap();
    let interview = h
        .pipeline()
        .complete_interview(interview.id, "passed", Some("great".into()), Some(90), h.interviewer.id)
        .await
        .unwrap();
    assert_eq!(interview.result, InterviewResult::Passed);

    let candidate = h.pipeline().get_candidate(candidate.id).await.unwrap();
    assert_eq!(candidate.status, CandidateStatus::Shortlisted);

    let candidate = h
        .pipeline()
        .finalize_selection(candidate.id, true, Some("offers/alice.pdf".into()), h.hr.id)
        .await
        .unwrap();
    assert_eq!(candidate.status, CandidateStatus::Selected);
    let selection = candidate.final_selection.as_ref().unwrap();
    assert!(selection.selected);
    assert_eq!(selection.selected_by, h.hr.id);

    h.flush().await;
    assert_eq!(
        h.notifier.events(),
        vec![
            NotificationEvent::ApplicationReceived,
            NotificationEvent::TaskSubmitted,
            NotificationEvent::InterviewScheduled,
            NotificationEvent::Selected,
        ]
    );
    assert!(h
        .notifier
        .sent()
        .iter()
        .all(|s| s.email == "alice@example.com"));
}

#[tokio::test]
async fn application_received_carries_task_link() {
    let h = Harness::new().await;
    let candidate = h.apply("bob@example.com").await;
    h.flush().await;

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].payload["application_id"], candidate.application_id);
    assert_eq!(sent[0].payload["task_link"], "https://tasks.example.com/rust");
}

#[tokio::test]
async fn duplicate_intake_is_conflict_and_creates_nothing() {
    let h = Harness::new().await;
    h.apply("dup@example.com").await;

    let err = h
        .pipeline()
        .intake(&h.job.job_id, applicant("DUP@example.com"), Some("cv.pdf".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "conflict");

    let all = h.pipeline().list_by_job(&h.job.job_id).await.unwrap();
    assert_eq!(all.len(), 1);
    h.flush().await;
    assert_eq!(h.notifier.events().len(), 1);
}

#[tokio::test]
async fn intake_validates_before_touching_the_job() {
    let h = Harness::new().await;

    let err = h
        .pipeline()
        .intake("NOSUCHJB", applicant("a@example.com"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let err = h
        .pipeline()
        .intake("NOSUCHJB", applicant("not-an-email"), Some("cv.pdf".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let mut nameless = applicant("a@example.com");
    nameless.name = "   ".into();
    let err = h
        .pipeline()
        .intake(&h.job.job_id, nameless, Some("cv.pdf".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let mut negative = applicant("a@example.com");
    negative.expected_salary = Some(Decimal::new(-1, 0));
    let err = h
        .pipeline()
        .intake(&h.job.job_id, negative, Some("cv.pdf".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let err = h
        .pipeline()
        .intake("NOSUCHJB", applicant("a@example.com"), Some("cv.pdf".into()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn submit_task_link_rules() {
    let h = Harness::new().await;
    let candidate = h.apply("links@example.com").await;

    let err = h
        .pipeline()
        .submit_task(&candidate.application_id, vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let eleven = (0..11)
        .map(|i| TaskLink {
            kind: LinkKind::Other,
            url: format!("https://example.com/{}", i),
        })
        .collect();
    let err = h
        .pipeline()
        .submit_task(&candidate.application_id, eleven)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let bad = vec![TaskLink {
        kind: LinkKind::Live,
        url: "not a url".into(),
    }];
    let err = h
        .pipeline()
        .submit_task(&candidate.application_id, bad)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let err = h
        .pipeline()
        .submit_task("APP-0-missing00", github_link())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn resubmission_replaces_links_while_task_pending() {
    let h = Harness::new().await;
    let candidate = h.apply("resubmit@example.com").await;
    h.pipeline()
        .set_status(candidate.id, "task_pending", h.hr.id)
        .await
        .unwrap();

    let links = vec![
        TaskLink {
            kind: LinkKind::Github,
            url: "https://github.com/a/b".into(),
        },
        TaskLink {
            kind: LinkKind::Live,
            url: "https://b.example.com".into(),
        },
    ];
    let candidate = h
        .pipeline()
        .submit_task(&candidate.application_id, links)
        .await
        .unwrap();
    let submission = candidate.task_submission.unwrap();
    assert_eq!(submission.links.len(), 2);
    assert_eq!(submission.links[1].kind, LinkKind::Live);
}

#[tokio::test]
async fn submit_task_in_wrong_state_leaves_submission_unchanged() {
    let h = Harness::new().await;
    let candidate = h.submitted("late@example.com").await;
    let before = candidate.task_submission.clone();

    let err = h
        .pipeline()
        .submit_task(
            &candidate.application_id,
            vec![TaskLink {
                kind: LinkKind::Other,
                url: "https://example.com/other".into(),
            }],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_state");

    let after = h.pipeline().get_candidate(candidate.id).await.unwrap();
    assert_eq!(after.task_submission, before);
    assert_eq!(after.version, candidate.version);
}

#[tokio::test]
async fn evaluation_boundary_at_sixty() {
    let h = Harness::new().await;

    let low = h.submitted("low@example.com").await;
    let low = h
        .pipeline()
        .evaluate(low.id, 59, None, h.interviewer.id)
        .await
        .unwrap();
    assert_eq!(low.status, CandidateStatus::UnderReview);
    assert_eq!(low.evaluation.as_ref().unwrap().score, 59);

    let pass = h.submitted("pass@example.com").await;
    let pass = h
        .pipeline()
        .evaluate(pass.id, 60, None, h.interviewer.id)
        .await
        .unwrap();
    assert_eq!(pass.status, CandidateStatus::InterviewEligible);
}

#[tokio::test]
async fn evaluation_rejects_out_of_range_and_wrong_state() {
    let h = Harness::new().await;
    let candidate = h.apply("range@example.com").await;

    let err = h
        .pipeline()
        .evaluate(candidate.id, 101, None, h.interviewer.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let err = h
        .pipeline()
        .evaluate(candidate.id, 80, None, h.interviewer.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_state");

    let unchanged = h.pipeline().get_candidate(candidate.id).await.unwrap();
    assert!(unchanged.evaluation.is_none());
}

#[tokio::test]
async fn evaluate_sends_no_notification() {
    let h = Harness::new().await;
    h.eligible("quiet@example.com").await;
    h.flush().await;
    assert_eq!(
        h.notifier.events(),
        vec![
            NotificationEvent::ApplicationReceived,
            NotificationEvent::TaskSubmitted
        ]
    );
}

#[tokio::test]
async fn set_status_accepts_any_known_status_and_audits() {
    let h = Harness::new().await;
    let candidate = h.apply("override@example.com").await;

    let updated = h
        .pipeline()
        .set_status(candidate.id, "Interview Eligible", h.hr.id)
        .await
        .unwrap();
    assert_eq!(updated.status, CandidateStatus::InterviewEligible);
    assert_eq!(updated.version, candidate.version + 1);

    let err = h
        .pipeline()
        .set_status(candidate.id, "hired", h.hr.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");

    let audit = h.store.audit_entries().unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "candidate.status_override");
    assert_eq!(audit[0].user_id, Some(h.hr.id));
    let changes = audit[0].changes.as_ref().unwrap();
    assert_eq!(changes["from"], "applied");
    assert_eq!(changes["to"], "interview_eligible");
}

#[tokio::test]
async fn override_back_to_task_submitted_allows_reevaluation() {
    let h = Harness::new().await;
    let candidate = h.eligible("again@example.com").await;

    h.pipeline()
        .set_status(candidate.id, "task_submitted", h.hr.id)
        .await
        .unwrap();
    let candidate = h
        .pipeline()
        .evaluate(candidate.id, 40, Some("second look".into()), h.interviewer.id)
        .await
        .unwrap();
    assert_eq!(candidate.status, CandidateStatus::UnderReview);
    assert_eq!(candidate.evaluation.unwrap().score, 40);
}

#[tokio::test]
async fn rejection_notifies_and_terminal_candidates_cannot_be_decided_again() {
    let h = Harness::new().await;
    let candidate = h.eligible("reject@example.com").await;

    let candidate = h
        .pipeline()
        .finalize_selection(candidate.id, false, None, h.hr.id)
        .await
        .unwrap();
    assert_eq!(candidate.status, CandidateStatus::Rejected);

    let err = h
        .pipeline()
        .finalize_selection(candidate.id, true, None, h.hr.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_state");

    h.flush().await;
    assert_eq!(
        h.notifier.events().last(),
        Some(&NotificationEvent::Rejected)
    );
}

#[tokio::test]
async fn delete_is_audited_and_removes_candidate() {
    let h = Harness::new().await;
    let candidate = h.apply("gone@example.com").await;

    h.pipeline()
        .delete_candidate(candidate.id, h.hr.id)
        .await
        .unwrap();
    let err = h.pipeline().get_candidate(candidate.id).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
    let err = h
        .pipeline()
        .get_by_application_id(&candidate.application_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let audit = h.store.audit_entries().unwrap();
    assert_eq!(audit.last().unwrap().action, "candidate.delete");

    let err = h
        .pipeline()
        .delete_candidate(Uuid::new_v4(), h.hr.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_evaluate_and_set_status_serialize() {
    for round in 0..20 {
        let h = Harness::new().await;
        let candidate = h.submitted(&format!("race{}@example.com", round)).await;
        let (id, base) = (candidate.id, candidate.version);

        let evaluate = {
            let pipeline = h.pipeline().clone();
            let evaluator = h.interviewer.id;
            tokio::spawn(async move { pipeline.evaluate(id, 80, None, evaluator).await })
        };
        let set_status = {
            let pipeline = h.pipeline().clone();
            let actor = h.hr.id;
            tokio::spawn(async move {
                pipeline
                    .set_status(id, "under_review", actor)
                    .await
            })
        };

        let evaluated = evaluate.await.unwrap();
        let overridden = set_status.await.unwrap();
        assert!(overridden.is_ok());

        let stored = h.pipeline().get_candidate(id).await.unwrap();
        match evaluated {
            // Evaluation ran first; the override then landed on top of it.
            Ok(_) => {
                assert_eq!(stored.version, base + 2);
                assert_eq!(stored.evaluation.unwrap().score, 80);
            }
            Err(err) => {
                assert_eq!(err.kind(), "invalid_state");
                assert_eq!(stored.version, base + 1);
                assert!(stored.evaluation.is_none());
            }
        }
        assert_eq!(stored.status, CandidateStatus::UnderReview);
    }
}
