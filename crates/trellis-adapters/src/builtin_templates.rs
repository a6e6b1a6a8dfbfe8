//! Templates compiled into the binary.
//!
//! One template per component kind plus the `project` template used by
//! `trellis create`. Paths and contents use `{{tmpl.<name>}}` placeholders.
//!
//! Parameters available to every template:
//!
//! | parameter          | example          | source                    |
//! |--------------------|------------------|---------------------------|
//! | `project_name`     | `BAR`            | `create` argument         |
//! | `package_name`     | `bar`            | derived or `--package-name` |
//! | `year`             | `2026`           | clock                     |
//! | `trellis_version`  | `0.1.0`          | this build                |
//! | `author_full_name` | `Jane Doe`       | `[defaults]` config       |
//! | `author_email`     | `jane@x.org`     | `[defaults]` config       |
//! | `license`          | `MIT`            | `[defaults]` config       |
//! | `python_version`   | `3.10`           | `[defaults]` config       |
//!
//! Component templates additionally get `component_name` (`soup`),
//! `component_path` (`foo/soup`) and `module_path` (`bar.foo.soup`).

use trellis_core::domain::{ComponentKind, Template};

/// Every built-in template.
pub fn all_templates() -> Vec<Template> {
    let mut templates = vec![project()];
    templates.extend(ComponentKind::ALL.into_iter().map(component));
    templates
}

/// Built-in template for a component kind.
pub fn component(kind: ComponentKind) -> Template {
    match kind {
        ComponentKind::PythonModule => module_py(),
        ComponentKind::PythonPackage => package_py(),
        ComponentKind::FortranExtension => module_f90(),
        ComponentKind::CppExtension => module_cpp(),
        ComponentKind::CliSingleCommand => app_single_command(),
        ComponentKind::CliWithSubcommands => app_sub_commands(),
    }
}

// ── Project ───────────────────────────────────────────────────────────────────

pub fn project() -> Template {
    Template::new("project", "Python project skeleton")
        .with_file(
            "pyproject.toml",
            r#"[build-system]
requires = ["setuptools>=61"]
build-backend = "setuptools.build_meta"

[project]
name = "{{tmpl.project_name}}"
version = "0.0.0"
description = "<Enter a one-sentence description of this project here.>"
readme = "README.md"
authors = [{ name = "{{tmpl.author_full_name}}", email = "{{tmpl.author_email}}" }]
license = { text = "{{tmpl.license}}" }
requires-python = ">={{tmpl.python_version}}"

[project.scripts]

[tool.setuptools.packages.find]
include = ["{{tmpl.package_name}}*"]
"#,
        )
        .with_file(
            "README.md",
            "# {{tmpl.project_name}}\n\n\
             <Enter a one-sentence description of this project here.>\n\n\
             Copyright (c) {{tmpl.year}} {{tmpl.author_full_name}}. \
             Licensed under {{tmpl.license}}.\n",
        )
        .with_file(
            "API.rst",
            "API\n===\n\n.. automodule:: {{tmpl.package_name}}\n   :members:\n",
        )
        .with_file(
            "{{tmpl.package_name}}/__init__.py",
            "\"\"\"\nPackage {{tmpl.package_name}}\n=======\n\n\
             Top-level package of {{tmpl.project_name}}.\n\"\"\"\n\n\
             __version__ = \"0.0.0\"\n",
        )
        .with_file(
            "tests/{{tmpl.package_name}}/test_{{tmpl.package_name}}.py",
            "\"\"\"Tests for package `{{tmpl.package_name}}`.\"\"\"\n\n\
             import {{tmpl.package_name}}\n\n\n\
             def test_version():\n    assert {{tmpl.package_name}}.__version__\n",
        )
        .with_file(
            ".gitignore",
            "__pycache__/\n*.py[cod]\n*.so\n.venv/\n_build/\n_cmake_build/\ntrellis.log\n",
        )
}

// ── Tree-like components ──────────────────────────────────────────────────────

fn module_py() -> Template {
    Template::new(
        ComponentKind::PythonModule.template_name(),
        "Python module (a directory with __init__.py)",
    )
    .with_file(
        "{{tmpl.package_name}}/{{tmpl.component_path}}/__init__.py",
        "\"\"\"\nModule {{tmpl.module_path}}\n\"\"\"\n\n\n\
         def greet(who=\"world\"):\n    \"\"\"Return a greeting for `who`.\"\"\"\n    \
         return f\"Hello {who}!\"\n",
    )
    .with_file(
        "tests/{{tmpl.package_name}}/{{tmpl.component_path}}/test_{{tmpl.component_name}}.py",
        "\"\"\"Tests for module `{{tmpl.module_path}}`.\"\"\"\n\n\
         import {{tmpl.module_path}}\n\n\n\
         def test_greet():\n    \
         assert {{tmpl.module_path}}.greet(\"John\") == \"Hello John!\"\n",
    )
}

fn package_py() -> Template {
    Template::new(
        ComponentKind::PythonPackage.template_name(),
        "Python package with a core module",
    )
    .with_file(
        "{{tmpl.package_name}}/{{tmpl.component_path}}/__init__.py",
        "\"\"\"\nPackage {{tmpl.module_path}}\n\"\"\"\n\nfrom .core import greet\n",
    )
    .with_file(
        "{{tmpl.package_name}}/{{tmpl.component_path}}/core.py",
        "\"\"\"Core of {{tmpl.module_path}}.\"\"\"\n\n\n\
         def greet(who=\"world\"):\n    return f\"Hello {who}!\"\n",
    )
    .with_file(
        "tests/{{tmpl.package_name}}/{{tmpl.component_path}}/test_{{tmpl.component_name}}.py",
        "\"\"\"Tests for package `{{tmpl.module_path}}`.\"\"\"\n\n\
         import {{tmpl.module_path}}\n\n\n\
         def test_greet():\n    \
         assert {{tmpl.module_path}}.greet(\"John\") == \"Hello John!\"\n",
    )
}

fn module_f90() -> Template {
    Template::new(
        ComponentKind::FortranExtension.template_name(),
        "Fortran binary extension module (sources only)",
    )
    .with_file(
        "{{tmpl.package_name}}/{{tmpl.component_path}}/{{tmpl.component_name}}.f90",
        "!-------------------------------------------------------------------------------\n\
         ! Fortran source of binary extension module {{tmpl.module_path}}\n\
         !-------------------------------------------------------------------------------\n\n\
         subroutine add(x, y, z, n)\n  \
         ! Compute the sum of arrays x and y and store the result in z.\n  \
         integer*4, intent(in) :: n\n  \
         real*8, dimension(n), intent(in) :: x, y\n  \
         real*8, dimension(n), intent(inout) :: z\n  \
         z = x + y\n\
         end subroutine add\n",
    )
    .with_file(
        "tests/{{tmpl.package_name}}/{{tmpl.component_path}}/test_{{tmpl.component_name}}.py",
        "\"\"\"Tests for f90 module `{{tmpl.module_path}}`.\"\"\"\n\n\
         import numpy as np\n\n\
         import {{tmpl.module_path}} as f90\n\n\n\
         def test_f90_add():\n    \
         x = np.array([0, 1, 2, 3, 4], dtype=float)\n    \
         y = np.ones(x.shape, dtype=float)\n    \
         z = np.zeros(x.shape, dtype=float)\n    \
         f90.add(x, y, z)\n    \
         assert (z == x + y).all()\n",
    )
}

fn module_cpp() -> Template {
    Template::new(
        ComponentKind::CppExtension.template_name(),
        "C++ binary extension module (sources only)",
    )
    .with_file(
        "{{tmpl.package_name}}/{{tmpl.component_path}}/{{tmpl.component_name}}.cpp",
        "/*\n *  C++ source of binary extension module {{tmpl.module_path}}\n */\n\n\
         #include <pybind11/pybind11.h>\n\
         #include <pybind11/numpy.h>\n\n\
         namespace py = pybind11;\n\n\
         void add(py::array_t<double> x, py::array_t<double> y, py::array_t<double> z)\n\
         {\n    \
         auto bx = x.request(), by = y.request(), bz = z.request();\n    \
         auto px = static_cast<double*>(bx.ptr);\n    \
         auto py_ = static_cast<double*>(by.ptr);\n    \
         auto pz = static_cast<double*>(bz.ptr);\n    \
         for (py::ssize_t i = 0; i < bx.shape[0]; ++i) pz[i] = px[i] + py_[i];\n\
         }\n\n\
         PYBIND11_MODULE({{tmpl.component_name}}, m)\n\
         {\n    \
         m.doc() = \"pybind11 {{tmpl.component_name}} plugin\";\n    \
         m.def(\"add\", &add, \"Compute the sum of x and y in z\");\n\
         }\n",
    )
    .with_file(
        "tests/{{tmpl.package_name}}/{{tmpl.component_path}}/test_{{tmpl.component_name}}.py",
        "\"\"\"Tests for C++ module `{{tmpl.module_path}}`.\"\"\"\n\n\
         import numpy as np\n\n\
         import {{tmpl.module_path}} as cpp\n\n\n\
         def test_cpp_add():\n    \
         x = np.array([0, 1, 2, 3, 4], dtype=float)\n    \
         y = np.ones(x.shape, dtype=float)\n    \
         z = np.zeros(x.shape, dtype=float)\n    \
         cpp.add(x, y, z)\n    \
         assert (z == x + y).all()\n",
    )
}

// ── CLI-like components ───────────────────────────────────────────────────────

const CLI_PACKAGE_INIT: &str = "\"\"\"Command line interfaces of {{tmpl.package_name}}.\"\"\"\n";

fn app_single_command() -> Template {
    Template::new(
        ComponentKind::CliSingleCommand.template_name(),
        "Click CLI with a single command",
    )
    .with_shared_file("{{tmpl.package_name}}/cli/__init__.py", CLI_PACKAGE_INIT)
    .with_file(
        "{{tmpl.package_name}}/cli/{{tmpl.component_name}}.py",
        "\"\"\"Command line interface {{tmpl.component_name}}.\"\"\"\n\n\
         import click\n\n\n\
         @click.command()\n\
         @click.option(\"-v\", \"--verbosity\", count=True, help=\"The verbosity of the CLI.\")\n\
         def main(verbosity):\n    \
         \"\"\"Entry point of {{tmpl.component_name}}.\"\"\"\n    \
         if verbosity:\n        \
         click.echo(\"running {{tmpl.component_name}}\")\n",
    )
    .with_file(
        "tests/{{tmpl.package_name}}/cli/test_{{tmpl.component_name}}.py",
        "\"\"\"Tests for the `{{tmpl.component_name}}` CLI.\"\"\"\n\n\
         from click.testing import CliRunner\n\n\
         from {{tmpl.module_path}} import main\n\n\n\
         def test_main():\n    \
         result = CliRunner().invoke(main, [\"-vv\"])\n    \
         assert \"running\" in result.output\n",
    )
}

fn app_sub_commands() -> Template {
    Template::new(
        ComponentKind::CliWithSubcommands.template_name(),
        "Click CLI with sub-commands",
    )
    .with_shared_file("{{tmpl.package_name}}/cli/__init__.py", CLI_PACKAGE_INIT)
    .with_file(
        "{{tmpl.package_name}}/cli/{{tmpl.component_name}}.py",
        "\"\"\"Command line interface {{tmpl.component_name}} with sub-commands.\"\"\"\n\n\
         import click\n\n\n\
         @click.group()\n\
         @click.option(\"-v\", \"--verbosity\", count=True, help=\"The verbosity of the CLI.\")\n\
         @click.pass_context\n\
         def main(ctx, verbosity):\n    \
         \"\"\"Entry point of {{tmpl.component_name}}.\"\"\"\n    \
         ctx.obj = {\"verbosity\": verbosity}\n\n\n\
         @main.command()\n\
         @click.option(\"--who\", default=\"world\", help=\"Who to greet.\")\n\
         def hello(who):\n    \
         \"\"\"Say hello.\"\"\"\n    \
         click.echo(f\"Hello {who}\")\n",
    )
    .with_file(
        "tests/{{tmpl.package_name}}/cli/test_{{tmpl.component_name}}.py",
        "\"\"\"Tests for the `{{tmpl.component_name}}` CLI.\"\"\"\n\n\
         from click.testing import CliRunner\n\n\
         from {{tmpl.module_path}} import main\n\n\n\
         def test_hello():\n    \
         result = CliRunner().invoke(main, [\"hello\"])\n    \
         assert \"Hello world\" in result.output\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::domain::DomainValidator;

    #[test]
    fn all_builtin_templates_are_valid() {
        let templates = all_templates();
        assert_eq!(templates.len(), 1 + ComponentKind::ALL.len());
        for template in &templates {
            DomainValidator::validate_template(template).unwrap();
        }
    }

    #[test]
    fn template_ids_follow_kind_names() {
        for kind in ComponentKind::ALL {
            assert_eq!(component(kind).id.name(), kind.template_name());
        }
    }

    #[test]
    fn component_templates_only_need_known_parameters() {
        let known = [
            "project_name",
            "package_name",
            "component_name",
            "component_path",
            "module_path",
        ];
        for kind in ComponentKind::ALL {
            for name in component(kind).required_parameters() {
                assert!(known.contains(&name.as_str()), "{kind}: {name}");
            }
        }
    }
}
