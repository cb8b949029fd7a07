//! Role gates used by the request handlers
//!
//! Three roles exist: `student`, `instructor` and `admin`. Admins pass every
//! instructor gate.

use campus_types::auth_adapter::AuthCtx;
use campus_types::meta_adapter::Course;

use crate::prelude::*;

/// Instructor or admin, else `PermissionDenied`
pub fn require_instructor(auth: &AuthCtx) -> ClResult<()> {
	if auth.is_instructor() { Ok(()) } else { Err(Error::PermissionDenied) }
}

pub fn require_admin(auth: &AuthCtx) -> ClResult<()> {
	if auth.is_admin() { Ok(()) } else { Err(Error::PermissionDenied) }
}

/// Course content editing: instructors, admins and the course creator
pub fn can_edit_course(auth: &AuthCtx, course: &Course) -> bool {
	auth.is_instructor() || course.creator_id == Some(auth.user_id)
}

/// Module reading: enrolled users plus everyone who can edit the course
pub fn can_view_module(auth: &AuthCtx, course: &Course, is_enrolled: bool) -> bool {
	is_enrolled || can_edit_course(auth, course)
}

/// Users who see every module unlocked
pub fn bypasses_module_lock(auth: Option<&AuthCtx>, course: &Course) -> bool {
	auth.is_some_and(|auth| can_edit_course(auth, course))
}

#[cfg(test)]
mod tests {
	use super::*;
	use campus_types::auth_adapter::{ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT};
	use campus_types::meta_adapter::{CourseLevel, CourseStatus, Visibility};

	fn auth(id: i64, role: &str) -> AuthCtx {
		AuthCtx { user_id: UserId(id), username: format!("user{}", id).into(), role: role.into() }
	}

	fn course(instructor: i64, creator: Option<i64>) -> Course {
		Course {
			id: 1,
			title: "Rust".into(),
			description: None,
			instructor_id: UserId(instructor),
			creator_id: creator.map(UserId),
			category_id: None,
			level: CourseLevel::Basico,
			status: CourseStatus::Published,
			visibility: Visibility::Public,
			price: 0.0,
			is_free: true,
			created_at: Timestamp(0),
		}
	}

	#[test]
	fn test_role_gates() {
		assert!(require_instructor(&auth(1, ROLE_INSTRUCTOR)).is_ok());
		assert!(require_instructor(&auth(1, ROLE_ADMIN)).is_ok());
		assert!(matches!(require_instructor(&auth(1, ROLE_STUDENT)), Err(Error::PermissionDenied)));
		assert!(require_admin(&auth(1, ROLE_ADMIN)).is_ok());
		assert!(require_admin(&auth(1, ROLE_INSTRUCTOR)).is_err());
	}

	#[test]
	fn test_course_creator_can_edit() {
		let c = course(9, Some(3));
		assert!(can_edit_course(&auth(3, ROLE_STUDENT), &c));
		assert!(!can_edit_course(&auth(4, ROLE_STUDENT), &c));
		assert!(can_edit_course(&auth(4, ROLE_INSTRUCTOR), &c));
	}

	#[test]
	fn test_module_visibility() {
		let c = course(9, None);
		let student = auth(5, ROLE_STUDENT);
		assert!(!can_view_module(&student, &c, false));
		assert!(can_view_module(&student, &c, true));
		assert!(can_view_module(&auth(6, ROLE_ADMIN), &c, false));
		assert!(!bypasses_module_lock(None, &c));
		assert!(!bypasses_module_lock(Some(&student), &c));
	}
}

// vim: ts=4
