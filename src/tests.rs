mod integration_tests {
    use crate::cli::commands::import_django::import_from_reader;
    use crate::cli::commands::profiles::{
        create_profile, delete_profile, list_profiles, show_profile, update_profile,
        CreateProfileArgs, UpdateProfileArgs,
    };
    use crate::cli::commands::roles::{create_role, delete_role, list_roles, show_role};
    use crate::cli::{Cli, Commands, ProfileCommand, RoleCommand};
    use crate::test_utils::setup_test_db;
    use chrono::NaiveDate;
    use clap::Parser;
    use model::ModelError;

    fn create_args(username: &str) -> CreateProfileArgs {
        CreateProfileArgs {
            username: username.to_string(),
            password_hash: "argon2$hash".to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            birth_date: None,
            number: String::new(),
            gender: String::new(),
            role_id: None,
            picture: None,
        }
    }

    fn model_error(err: &anyhow::Error) -> &ModelError {
        err.downcast_ref::<ModelError>()
            .unwrap_or_else(|| panic!("Expected a model error, got {:?}", err))
    }

    #[tokio::test]
    async fn test_role_lifecycle() {
        let db = setup_test_db().await;

        let created = create_role(&db, "moderator").await.unwrap();
        assert_eq!(created.name, "moderator");

        let by_id = show_role(&db, Some(created.id), None).await.unwrap();
        let by_name = show_role(&db, None, Some("moderator")).await.unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_name, created);

        assert_eq!(list_roles(&db).await.unwrap(), vec![created.clone()]);

        let deleted = delete_role(&db, created.id).await.unwrap();
        assert!(deleted.deleted);
        let deleted_again = delete_role(&db, created.id).await.unwrap();
        assert!(!deleted_again.deleted);

        assert!(show_role(&db, Some(created.id), None).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_role_name() {
        let db = setup_test_db().await;

        create_role(&db, "moderator").await.unwrap();
        let err = create_role(&db, "moderator").await.unwrap_err();
        assert!(model_error(&err).is_uniqueness_violation());
    }

    #[tokio::test]
    async fn test_profile_lifecycle() {
        let db = setup_test_db().await;
        let role = create_role(&db, "member").await.unwrap();

        let mut args = create_args("alice");
        args.birth_date = NaiveDate::from_ymd_opt(1991, 7, 30);
        args.gender = "F".to_string();
        args.role_id = Some(role.id);
        args.picture = Some("selfie.JPG".to_string());
        let created = create_profile(&db, args).await.unwrap();

        assert_eq!(created.username, "alice");
        assert_eq!(created.gender.as_deref(), Some("F"));
        assert_eq!(created.role_id, Some(role.id));
        assert!(created.profile_picture.as_deref().unwrap().ends_with(".JPG"));

        let shown = show_profile(&db, None, Some("alice")).await.unwrap();
        assert_eq!(shown, created);

        let updated = update_profile(
            &db,
            UpdateProfileArgs {
                id: created.id,
                number: Some("777 123 456".to_string()),
                clear_role: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.number, "777 123 456");
        assert_eq!(updated.role_id, None);
        assert_eq!(updated.birth_date, created.birth_date);
        assert_eq!(updated.created_at, created.created_at);

        let deleted = delete_profile(&db, created.id).await.unwrap();
        assert!(deleted.deleted);
        assert!(list_profiles(&db).await.unwrap().is_empty());

        let err = delete_profile(&db, created.id).await.unwrap_err();
        assert!(matches!(model_error(&err), ModelError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_profile_output_omits_password() {
        let db = setup_test_db().await;

        let created = create_profile(&db, create_args("bob")).await.unwrap();
        let json = serde_json::to_value(&created).unwrap();

        assert!(json.get("password").is_none());
        assert!(!json.to_string().contains("argon2$hash"));
    }

    #[tokio::test]
    async fn test_invalid_gender_is_validation_error() {
        let db = setup_test_db().await;

        let mut args = create_args("carol");
        args.gender = "Z".to_string();
        let err = create_profile(&db, args).await.unwrap_err();
        assert!(model_error(&err).is_validation());

        let created = create_profile(&db, create_args("carol")).await.unwrap();
        let err = update_profile(
            &db,
            UpdateProfileArgs {
                id: created.id,
                gender: Some("female".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(model_error(&err).is_validation());
    }

    #[tokio::test]
    async fn test_deleting_role_keeps_profiles() {
        let db = setup_test_db().await;
        let role = create_role(&db, "member").await.unwrap();

        let mut args = create_args("dave");
        args.role_id = Some(role.id);
        let created = create_profile(&db, args).await.unwrap();

        delete_role(&db, role.id).await.unwrap();

        let profile = show_profile(&db, Some(created.id), None).await.unwrap();
        assert_eq!(profile.role_id, None);
        assert_eq!(profile.username, "dave");
    }

    const DJANGO_DUMP: &str = r#"[
        {"model": "contenttypes.contenttype", "pk": 1, "fields": {"app_label": "users", "model": "role"}},
        {"model": "sessions.session", "pk": "k3y", "fields": {"session_data": "x", "expire_date": "2024-01-01T00:00:00Z"}},
        {"model": "users.role", "pk": 7, "fields": {"name": "lecturer"}},
        {"model": "users.role", "pk": 8, "fields": {"name": "student"}},
        {"model": "users.profile", "pk": 3, "fields": {
            "password": "pbkdf2_sha256$600000$abc$def",
            "last_login": null,
            "is_superuser": false,
            "username": "jnovak",
            "first_name": "Jan",
            "last_name": "Novak",
            "email": "jan@example.com",
            "is_staff": false,
            "is_active": true,
            "date_joined": "2024-02-01T08:00:00Z",
            "birth_date": "1988-11-05",
            "number": "+420111222333",
            "gender": "M",
            "created_at": "2024-02-01T08:00:00.123Z",
            "profile_picture": "profile_pics/0b5c4f0e-6f2b-4a8e-9d51-7d2f5c3e9a11.png",
            "roles": 8,
            "groups": [],
            "user_permissions": []
        }},
        {"model": "users.profile", "pk": 4, "fields": {
            "password": "pbkdf2_sha256$600000$ghi$jkl",
            "username": "pdvorak",
            "first_name": "",
            "last_name": "",
            "email": "",
            "is_active": false,
            "birth_date": null,
            "number": "",
            "gender": "",
            "created_at": "2024-03-10T10:30:00Z",
            "profile_picture": "",
            "roles": null
        }}
    ]"#;

    #[tokio::test]
    async fn test_import_django_dump() {
        let db = setup_test_db().await;
        // An existing role with the same name is reused
        let existing = create_role(&db, "lecturer").await.unwrap();

        let summary = import_from_reader(&db, DJANGO_DUMP.as_bytes()).await.unwrap();
        assert_eq!(summary.roles_created, 1);
        assert_eq!(summary.roles_reused, 1);
        assert_eq!(summary.profiles_created, 2);
        assert_eq!(summary.profiles_skipped, 0);
        assert_eq!(summary.records_ignored, 2);

        let roles = list_roles(&db).await.unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0], existing);
        let student = roles.iter().find(|r| r.name == "student").unwrap();

        let jan = show_profile(&db, None, Some("jnovak")).await.unwrap();
        assert_eq!(jan.first_name, "Jan");
        assert_eq!(jan.full_name, "Jan Novak");
        assert_eq!(jan.gender.as_deref(), Some("M"));
        assert_eq!(jan.birth_date, NaiveDate::from_ymd_opt(1988, 11, 5));
        assert_eq!(jan.role_id, Some(student.id));
        assert_eq!(
            jan.profile_picture.as_deref(),
            Some("profile_pics/0b5c4f0e-6f2b-4a8e-9d51-7d2f5c3e9a11.png")
        );
        let expected_created = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_milli_opt(8, 0, 0, 123)
            .unwrap();
        assert_eq!(jan.created_at, expected_created);

        let petr = show_profile(&db, None, Some("pdvorak")).await.unwrap();
        assert!(!petr.is_active);
        assert_eq!(petr.full_name, "");
        assert_eq!(petr.gender, None);
        assert_eq!(petr.profile_picture, None);
        assert_eq!(petr.role_id, None);

        // Importing the same dump again creates nothing new
        let again = import_from_reader(&db, DJANGO_DUMP.as_bytes()).await.unwrap();
        assert_eq!(again.roles_created, 0);
        assert_eq!(again.roles_reused, 2);
        assert_eq!(again.profiles_created, 0);
        assert_eq!(again.profiles_skipped, 2);
    }

    #[tokio::test]
    async fn test_import_is_atomic() {
        let db = setup_test_db().await;

        let dump = r#"[
            {"model": "users.role", "pk": 1, "fields": {"name": "lecturer"}},
            {"model": "users.profile", "pk": 1, "fields": {
                "password": "x", "username": "broken", "gender": "X"
            }}
        ]"#;

        assert!(import_from_reader(&db, dump.as_bytes()).await.is_err());
        assert!(list_roles(&db).await.unwrap().is_empty());
        assert!(list_profiles(&db).await.unwrap().is_empty());
    }

    fn profile_record(fields: serde_json::Value) -> serde_json::Value {
        let mut base = serde_json::json!({
            "password": "pbkdf2_sha256$600000$abc$def",
            "username": "jnovak",
            "gender": "",
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), fields.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::json!({"model": "users.profile", "pk": 1, "fields": base})
    }

    async fn assert_import_rejected(records: serde_json::Value) {
        let db = setup_test_db().await;
        let dump = serde_json::to_vec(&records).unwrap();

        let err = import_from_reader(&db, dump.as_slice()).await.unwrap_err();
        assert!(model_error(&err).is_validation(), "unexpected error: {:?}", err);
        assert!(list_roles(&db).await.unwrap().is_empty());
        assert!(list_profiles(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_rejects_overlong_role_name() {
        assert_import_rejected(serde_json::json!([
            {"model": "users.role", "pk": 1, "fields": {"name": "r".repeat(60)}},
            profile_record(serde_json::json!({})),
        ]))
        .await;
    }

    #[tokio::test]
    async fn test_import_rejects_overlong_profile_fields() {
        assert_import_rejected(serde_json::json!([
            {"model": "users.role", "pk": 1, "fields": {"name": "lecturer"}},
            profile_record(serde_json::json!({"number": "12345678901234567890"})),
        ]))
        .await;

        assert_import_rejected(serde_json::json!([
            profile_record(serde_json::json!({"username": "u".repeat(151)})),
        ]))
        .await;

        assert_import_rejected(serde_json::json!([
            profile_record(serde_json::json!({"profile_picture": format!("profile_pics/{}.png", "p".repeat(100))})),
        ]))
        .await;
    }

    #[tokio::test]
    async fn test_picture_path_runs_without_database() {
        let cli = Cli::try_parse_from([
            "userbase",
            "--database-url",
            "postgresql://nobody@127.0.0.1:1/missing",
            "picture-path",
            "avatar.png",
        ])
        .unwrap();
        let settings = crate::config::Settings {
            database_url: crate::config::DEFAULT_DATABASE_URL.to_string(),
            log_level: crate::config::DEFAULT_LOG_LEVEL.to_string(),
        };

        cli.run(settings).await.unwrap();
    }

    #[test]
    fn test_parse_profile_update_command() {
        let cli = Cli::try_parse_from([
            "userbase",
            "--database-url",
            "sqlite::memory:",
            "profile",
            "update",
            "--id",
            "5",
            "--gender",
            "",
            "--clear-picture",
            "--birth-date",
            "2001-02-03",
        ])
        .unwrap();

        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
        match cli.command {
            Commands::Profile {
                command: ProfileCommand::Update(args),
            } => {
                assert_eq!(args.id, 5);
                assert_eq!(args.gender.as_deref(), Some(""));
                assert!(args.clear_picture);
                assert_eq!(args.birth_date, NaiveDate::from_ymd_opt(2001, 2, 3));
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_flags_are_rejected() {
        let result = Cli::try_parse_from([
            "userbase", "profile", "update", "--id", "1", "--role-id", "2", "--clear-role",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["userbase", "role", "show", "--id", "1", "--name", "x"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["userbase", "role", "show"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_role_commands() {
        let cli = Cli::try_parse_from(["userbase", "role", "create", "--name", "editor"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Role {
                command: RoleCommand::Create { ref name }
            } if name == "editor"
        ));

        let cli = Cli::try_parse_from(["userbase", "role", "delete", "--id", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Role {
                command: RoleCommand::Delete { id: 3 }
            }
        ));
    }

    #[test]
    fn test_parse_picture_path_command() {
        let cli = Cli::try_parse_from(["userbase", "picture-path", "photo.jpg"]).unwrap();
        match cli.command {
            Commands::PicturePath { filename } => {
                let path = model::upload::profile_image_path(&filename).unwrap();
                let id = path
                    .strip_prefix("profile_pics/")
                    .and_then(|rest| rest.strip_suffix(".jpg"))
                    .unwrap();
                assert!(uuid::Uuid::parse_str(id).is_ok());
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }
}
