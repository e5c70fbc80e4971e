/// Separator used between packages and between package/class.
pub const TYPE_SEPARATOR: char = '.';

/// Separator of internal (class-file) names, `java/lang/Object`.
pub const INTERNAL_SEPARATOR: char = '/';

pub const CLASS_SUFFIX: &str = ".class";

/// Binary name to class-file path.
///
/// # Examples
/// ```ignore
/// class_file_path("ivonet.ClassInClass") => "ivonet/ClassInClass.class"
/// class_file_path("ivonet.Outer$Inner") => "ivonet/Outer$Inner.class"
/// ```
pub fn class_file_path(binary_name: &str) -> String {
    let mut path = binary_to_internal(binary_name);
    path.push_str(CLASS_SUFFIX);
    path
}

pub fn binary_to_internal(binary_name: &str) -> String {
    binary_name.replace(TYPE_SEPARATOR, "/")
}

pub fn internal_to_binary(internal_name: &str) -> String {
    internal_name.replace(INTERNAL_SEPARATOR, ".")
}
