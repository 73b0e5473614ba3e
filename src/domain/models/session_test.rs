use super::Session;
use crate::domain::models::Organization;
use crate::domain::models::User;

fn user() -> User {
    return User {
        id: 1,
        email: "a@b.com".to_string(),
        name: "A".to_string(),
        role: "admin".to_string(),
        organization: Organization {
            id: 2,
            name: "Org".to_string(),
        },
    };
}

#[test]
fn it_is_valid_with_an_access_token() {
    let session = Session {
        access_token: "tok1".to_string(),
        refresh_token: "ref1".to_string(),
        user: user(),
        saved_at: "".to_string(),
    };

    assert!(session.is_valid());
}

#[test]
fn it_is_invalid_without_an_access_token() {
    let session = Session {
        access_token: "".to_string(),
        refresh_token: "ref1".to_string(),
        user: user(),
        saved_at: "".to_string(),
    };

    assert!(!session.is_valid());
}

#[test]
fn it_deserializes_with_missing_optional_fields() {
    let session: Session = serde_json::from_str(
        r#"{"access_token":"tok1","user":{"id":1,"name":"A","organization":{"id":2,"name":"Org"}}}"#,
    )
    .unwrap();

    assert_eq!(session.access_token, "tok1");
    assert_eq!(session.refresh_token, "");
    assert_eq!(session.user.name, "A");
    assert_eq!(session.user.organization.id, 2);
}
