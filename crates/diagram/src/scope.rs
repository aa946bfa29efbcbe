//! 包类图的项目作用域判断

/// `candidate` 非空，且按段是 `prefix` 的真前缀时为 true
///
/// 以 `starts_with_but_not_equal(project_prefix, diagram_package)` 调用，
/// 用来识别位于项目包之上的目录
pub fn starts_with_but_not_equal<T: PartialEq>(prefix: &[T], candidate: &[T]) -> bool {
    !candidate.is_empty() && candidate.len() < prefix.len() && prefix.starts_with(candidate)
}

/// 没有条目的目录是否仍生成占位图
pub fn emits_empty_diagram(project_prefix: &[String], relative_path: &str) -> bool {
    if relative_path.trim().is_empty() {
        return false;
    }
    let diagram_package: Vec<String> = relative_path.split('/').map(str::to_string).collect();
    !starts_with_but_not_equal(project_prefix, &diagram_package)
}
